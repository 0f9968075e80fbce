use std::{
    error::Error,
    fmt,
    mem::{offset_of, size_of},
};

use eframe::glow;
use glam::{Vec3, Vec4};
use zerocopy::AsBytes;

use super::{Model, Vertex};

#[derive(Debug, Clone)]
pub enum MeshError {
    AlreadySetup,
}
impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySetup => write!(f, "MeshError: GL buffers were already created"),
        }
    }
}
impl Error for MeshError {}

/// Indexed triangle list with interleaved vertices.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub indices: Vec<u32>,

    // Rendering Information
    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
    ebo: Option<glow::Buffer>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               CPU Side                                                            //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Mesh {
    pub fn new(verts: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            verts,
            indices,
            ..Default::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_setup(&self) -> bool {
        self.vao.is_some()
    }

    /// Fills in the tangent of every vertex from the texture coordinates, `w` carries the handedness
    /// of the tangent frame so the bitangent is `cross(n, t) * w`.
    pub fn compute_tangents(&mut self) {
        let mut tan1 = vec![Vec3::ZERO; self.verts.len()];
        let mut tan2 = vec![Vec3::ZERO; self.verts.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (p1, p2, p3) = (self.verts[i0].pos(), self.verts[i1].pos(), self.verts[i2].pos());
            let (tc1, tc2, tc3) = (self.verts[i0].tex(), self.verts[i1].tex(), self.verts[i2].tex());

            let q1 = p2 - p1;
            let q2 = p3 - p1;
            let (s1, s2) = (tc2.x - tc1.x, tc3.x - tc1.x);
            let (t1, t2) = (tc2.y - tc1.y, tc3.y - tc1.y);

            let det = s1 * t2 - s2 * t1;
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (q1 * t2 - q2 * t1) * r;
            let bitangent = (q2 * s1 - q1 * s2) * r;

            for i in [i0, i1, i2] {
                tan1[i] += tangent;
                tan2[i] += bitangent;
            }
        }

        for (i, vtx) in self.verts.iter_mut().enumerate() {
            let n = vtx.nrm();
            let t = tan1[i];

            // Gram-Schmidt
            let mut tangent = (t - n * n.dot(t)).normalize_or_zero();
            if tangent == Vec3::ZERO {
                tangent = n.any_orthonormal_vector();
            }
            let handedness = if n.cross(t).dot(tan2[i]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            vtx.tan = Vec4::from((tangent, handedness)).to_array();
        }
    }

    /// Replaces the normals with the area weighted average of the adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.verts.len()];
        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (v1, v2, v3) = (self.verts[i0].pos(), self.verts[i1].pos(), self.verts[i2].pos());
            let face = (v2 - v1).cross(v3 - v1);
            for i in [i0, i1, i2] {
                normals[i] += face;
            }
        }
        for (vtx, nrm) in self.verts.iter_mut().zip(normals) {
            vtx.nrm = nrm.normalize_or_zero().to_array();
        }
    }

    /// Translates the mesh so the center of its bounding box sits on the origin.
    pub fn recenter(&mut self) {
        let Some(first) = self.verts.first() else {
            return;
        };
        let (min, max) = self
            .verts
            .iter()
            .fold((first.pos(), first.pos()), |(min, max), vtx| {
                (min.min(vtx.pos()), max.max(vtx.pos()))
            });
        let center = (min + max) * 0.5;
        self.verts
            .iter_mut()
            .for_each(|vtx| vtx.pos = (vtx.pos() - center).to_array());
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               GPU Side                                                            //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Creates two GL objects. When the second cannot be created the first is released again,
/// so a failed setup leaves nothing behind.
fn create_pair<A, B>(
    first: impl FnOnce() -> Result<A, String>,
    second: impl FnOnce() -> Result<B, String>,
    release: impl FnOnce(A),
) -> Result<(A, B), String> {
    let a = first()?;
    match second() {
        Ok(b) => Ok((a, b)),
        Err(e) => {
            release(a);
            Err(e)
        }
    }
}

impl Model for Mesh {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), Box<dyn Error>> {
        // Do not setup twice!
        if self.is_setup() {
            return Err(MeshError::AlreadySetup.into());
        }

        unsafe {
            use glow::HasContext as _;

            let (vao, (vbo, ebo)) = create_pair(
                || gl.create_vertex_array(),
                || {
                    create_pair(
                        || gl.create_buffer(),
                        || gl.create_buffer(),
                        |vbo| gl.delete_buffer(vbo),
                    )
                },
                |vao| gl.delete_vertex_array(vao),
            )?;
            self.vao = Some(vao);
            self.vbo = Some(vbo);
            self.ebo = Some(ebo);

            gl.bind_vertex_array(self.vao);
            gl.bind_buffer(glow::ARRAY_BUFFER, self.vbo);
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, self.verts.as_bytes(), glow::STATIC_DRAW);

            let stride = size_of::<Vertex>() as i32;
            let attributes = [
                (0, 3, offset_of!(Vertex, pos)),
                (1, 3, offset_of!(Vertex, nrm)),
                (2, 2, offset_of!(Vertex, tex)),
                (3, 4, offset_of!(Vertex, tan)),
            ];
            for (location, size, offset) in attributes {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(location, size, glow::FLOAT, false, stride, offset as _);
            }

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.ebo);
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                self.indices.as_bytes(),
                glow::STATIC_DRAW,
            );

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            if let Some(vao) = self.vao.take() {
                gl.delete_vertex_array(vao);
            }
            if let Some(vbo) = self.vbo.take() {
                gl.delete_buffer(vbo);
            }
            if let Some(ebo) = self.ebo.take() {
                gl.delete_buffer(ebo);
            }
        }
    }

    fn draw(&self, gl: &glow::Context) {
        if !self.is_setup() {
            return;
        }

        unsafe {
            use glow::HasContext as _;

            gl.bind_vertex_array(self.vao);
            gl.draw_elements(
                glow::TRIANGLES,
                self.indices.len() as _,
                glow::UNSIGNED_INT,
                0,
            );
            gl.bind_vertex_array(None);
        }
    }
}

/// Bare positions drawn with `glDrawArrays`, used for sprites and curve control points.
#[derive(Debug, Clone)]
pub struct PointBuffer {
    pub points: Vec<[f32; 3]>,
    mode: u32,

    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
}

impl PointBuffer {
    /// `mode` is the primitive handed to `glDrawArrays`, e.g. `glow::POINTS` or `glow::PATCHES`.
    pub fn new(points: Vec<[f32; 3]>, mode: u32) -> Self {
        Self {
            points,
            mode,
            vao: None,
            vbo: None,
        }
    }

    pub fn draw_as(&self, gl: &glow::Context, mode: u32) {
        let Some(vao) = self.vao else {
            return;
        };

        unsafe {
            use glow::HasContext as _;

            gl.bind_vertex_array(Some(vao));
            gl.draw_arrays(mode, 0, self.points.len() as _);
            gl.bind_vertex_array(None);
        }
    }
}

impl Model for PointBuffer {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), Box<dyn Error>> {
        if self.vao.is_some() {
            return Err(MeshError::AlreadySetup.into());
        }

        unsafe {
            use glow::HasContext as _;

            let (vao, vbo) = create_pair(
                || gl.create_vertex_array(),
                || gl.create_buffer(),
                |vao| gl.delete_vertex_array(vao),
            )?;
            self.vao = Some(vao);
            self.vbo = Some(vbo);

            gl.bind_buffer(glow::ARRAY_BUFFER, self.vbo);
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, self.points.as_bytes(), glow::STATIC_DRAW);

            gl.bind_vertex_array(self.vao);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 0, 0);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            if let Some(vao) = self.vao.take() {
                gl.delete_vertex_array(vao);
            }
            if let Some(vbo) = self.vbo.take() {
                gl.delete_buffer(vbo);
            }
        }
    }

    fn draw(&self, gl: &glow::Context) {
        self.draw_as(gl, self.mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn quad() -> Mesh {
        let verts = vec![
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 1.0, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
        ];
        Mesh::new(verts, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn tangent_follows_texture_s_axis() {
        let mut mesh = quad();
        mesh.compute_tangents();
        for vtx in &mesh.verts {
            assert!((vtx.tan() - Vec4::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5);
        }
    }

    #[test]
    fn mirrored_uvs_flip_handedness() {
        let mut mesh = quad();
        mesh.verts
            .iter_mut()
            .for_each(|vtx| vtx.tex[1] = 1.0 - vtx.tex[1]);
        mesh.compute_tangents();
        assert!(mesh.verts.iter().all(|vtx| vtx.tan[3] == -1.0));
    }

    #[test]
    fn degenerate_uvs_still_give_unit_tangents() {
        let mut mesh = quad();
        mesh.verts.iter_mut().for_each(|vtx| vtx.tex = [0.0; 2]);
        mesh.compute_tangents();
        for vtx in &mesh.verts {
            let t = vtx.tan().truncate();
            assert!((t.length() - 1.0).abs() < 1e-5);
            assert!(t.dot(vtx.nrm()).abs() < 1e-5);
        }
    }

    #[test]
    fn computed_normals_face_the_winding() {
        let mut mesh = quad();
        mesh.verts.iter_mut().for_each(|vtx| vtx.nrm = [0.0; 3]);
        mesh.compute_normals();
        assert!(mesh.verts.iter().all(|vtx| vtx.nrm() == Vec3::Z));
    }

    #[test]
    fn recenter_moves_bounds_to_origin() {
        let mut mesh = quad();
        mesh.recenter();
        assert_eq!(mesh.verts[0].pos(), Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(mesh.verts[2].pos(), Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn new_mesh_has_no_gl_objects() {
        let mesh = quad();
        assert!(!mesh.is_setup());
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn failed_second_object_releases_the_first() {
        use std::cell::RefCell;

        let mut released = Vec::new();
        let result: Result<(u32, u32), String> =
            create_pair(|| Ok(7), || Err("out of names".into()), |vao| released.push(vao));
        assert_eq!(result, Err("out of names".to_owned()));
        assert_eq!(released, [7]);

        let released = RefCell::new(Vec::new());
        let result = create_pair(
            || Ok(1u32),
            || {
                create_pair(
                    || Ok(2u32),
                    || Err::<u32, _>("no ebo".to_owned()),
                    |b| released.borrow_mut().push(b),
                )
            },
            |a| released.borrow_mut().push(a),
        );
        assert!(result.is_err());
        assert_eq!(*released.borrow(), [2, 1]);

        let result = create_pair(|| Ok(1u32), || Ok(2u32), |_| panic!("nothing to release"));
        assert_eq!(result, Ok((1, 2)));
    }
}
