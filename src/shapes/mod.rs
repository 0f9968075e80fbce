//! CPU side geometry for the demos. Every generator returns a [`Mesh`] with normals, texture coordinates
//! and tangents filled in; uploading is left to [`crate::gfx::Model::setup_gl`].

pub mod obj;

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::gfx::{Mesh, Vertex};

/// Axis aligned cube centered on the origin. Faces do not share vertices so every face gets its own normal
/// and a full `0..1` texture square.
pub fn cube(side: f32) -> Mesh {
    let h = side * 0.5;

    // (normal, s axis, t axis) with s x t == normal so faces wind counter-clockwise from outside
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut verts = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (nrm, s, t) in faces {
        let base = verts.len() as u32;
        for tex in corners {
            let pos = (nrm + s * (tex.x * 2.0 - 1.0) + t * (tex.y * 2.0 - 1.0)) * h;
            verts.push(Vertex::new(pos, nrm, tex));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut mesh = Mesh::new(verts, indices);
    mesh.compute_tangents();
    mesh
}

/// Flat grid in the XZ plane facing +Y.
pub fn plane(xsize: f32, zsize: f32, xdivs: u32, zdivs: u32) -> Mesh {
    let (xdivs, zdivs) = (xdivs.max(1), zdivs.max(1));
    let x2 = xsize / 2.0;
    let z2 = zsize / 2.0;

    let mut verts = Vec::with_capacity(((xdivs + 1) * (zdivs + 1)) as usize);
    for i in 0..=zdivs {
        let tz = i as f32 / zdivs as f32;
        for j in 0..=xdivs {
            let tx = j as f32 / xdivs as f32;
            let pos = Vec3::new(tx * xsize - x2, 0.0, tz * zsize - z2);
            verts.push(Vertex::new(pos, Vec3::Y, Vec2::new(tx, tz)));
        }
    }

    let mut indices = Vec::with_capacity((6 * xdivs * zdivs) as usize);
    for i in 0..zdivs {
        let row_start = i * (xdivs + 1);
        let next_row_start = (i + 1) * (xdivs + 1);
        for j in 0..xdivs {
            indices.extend_from_slice(&[
                row_start + j,
                next_row_start + j,
                next_row_start + j + 1,
                row_start + j,
                next_row_start + j + 1,
                row_start + j + 1,
            ]);
        }
    }

    let mut mesh = Mesh::new(verts, indices);
    mesh.compute_tangents();
    mesh
}

/// Torus around the Z axis. `outer` is the distance from the center to the middle of the tube,
/// `inner` the radius of the tube.
pub fn torus(outer: f32, inner: f32, nsides: u32, nrings: u32) -> Mesh {
    let (nsides, nrings) = (nsides.max(3), nrings.max(3));
    let ring_factor = TAU / nrings as f32;
    let side_factor = TAU / nsides as f32;

    let mut verts = Vec::with_capacity(((nsides + 1) * (nrings + 1)) as usize);
    for ring in 0..=nrings {
        let u = ring as f32 * ring_factor;
        let (su, cu) = u.sin_cos();
        for side in 0..=nsides {
            let v = side as f32 * side_factor;
            let (sv, cv) = v.sin_cos();
            let r = outer + inner * cv;

            let pos = Vec3::new(r * cu, r * su, inner * sv);
            let nrm = Vec3::new(cv * cu, cv * su, sv);
            let tex = Vec2::new(u / TAU, v / TAU);
            verts.push(Vertex::new(pos, nrm, tex));
        }
    }

    let mut indices = Vec::with_capacity((6 * nsides * nrings) as usize);
    for ring in 0..nrings {
        let ring_start = ring * (nsides + 1);
        let next_ring_start = (ring + 1) * (nsides + 1);
        for side in 0..nsides {
            let next_side = side + 1;
            indices.extend_from_slice(&[
                ring_start + side,
                next_ring_start + side,
                next_ring_start + next_side,
                ring_start + side,
                next_ring_start + next_side,
                ring_start + next_side,
            ]);
        }
    }

    let mut mesh = Mesh::new(verts, indices);
    mesh.compute_tangents();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &Mesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.verts.len()));
        for vtx in &mesh.verts {
            assert!((vtx.nrm().length() - 1.0).abs() < 1e-4, "{vtx:?}");
            let tan = vtx.tan().truncate();
            assert!((tan.length() - 1.0).abs() < 1e-4, "{vtx:?}");
            assert!(tan.dot(vtx.nrm()).abs() < 1e-4, "{vtx:?}");
        }
    }

    /// Every triangle's winding agrees with the normals of its vertices.
    fn assert_outward_winding(mesh: &Mesh) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.verts[i as usize]);
            let face = (b.pos() - a.pos()).cross(c.pos() - a.pos());
            if face.length() < 1e-6 {
                continue;
            }
            assert!(face.dot(a.nrm() + b.nrm() + c.nrm()) > 0.0);
        }
    }

    #[test]
    fn cube_counts_and_bounds() {
        let mesh = cube(1.0);
        assert_eq!(mesh.verts.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh
            .verts
            .iter()
            .all(|vtx| vtx.pos().abs().max_element() == 0.5));
        assert_well_formed(&mesh);
        assert_outward_winding(&mesh);
    }

    #[test]
    fn plane_counts() {
        let mesh = plane(50.0, 50.0, 1, 1);
        assert_eq!(mesh.verts.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.verts.iter().all(|vtx| vtx.nrm() == Vec3::Y));

        let grid = plane(10.0, 4.0, 5, 2);
        assert_eq!(grid.verts.len(), 6 * 3);
        assert_eq!(grid.triangle_count(), 2 * 5 * 2);
        assert_eq!(grid.verts[0].pos(), Vec3::new(-5.0, 0.0, -2.0));
        assert_eq!(grid.verts.last().unwrap().pos(), Vec3::new(5.0, 0.0, 2.0));
        assert_well_formed(&grid);
        assert_outward_winding(&grid);
    }

    #[test]
    fn torus_counts() {
        let mesh = torus(1.75, 0.75, 50, 50);
        assert_eq!(mesh.verts.len(), 51 * 51);
        assert_eq!(mesh.indices.len(), 6 * 50 * 50);
        assert_well_formed(&mesh);
        assert_outward_winding(&mesh);

        // Every vertex sits on the surface of the tube
        for vtx in &mesh.verts {
            let p = vtx.pos();
            let ring = Vec3::new(p.x, p.y, 0.0).normalize() * 1.75;
            assert!(((p - ring).length() - 0.75).abs() < 1e-4);
        }
    }
}
