use std::{
    collections::HashMap,
    error::Error,
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use glam::{Vec2, Vec3};
use log::debug;

use crate::gfx::{Mesh, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjOptions {
    pub recenter: bool,
    pub tangents: bool,
}

#[derive(Debug)]
pub enum ObjError {
    Io(PathBuf, io::Error),
    Read(io::Error),
    Parse { line: usize, msg: String },
    Empty,
}
impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Could not open mesh {}: {e}", path.display()),
            Self::Read(e) => write!(f, "ObjError: {e}"),
            Self::Parse { line, msg } => write!(f, "ObjError: line {line}: {msg}"),
            Self::Empty => write!(f, "ObjError: no faces"),
        }
    }
}
impl Error for ObjError {}

pub fn load(path: &Path, opts: ObjOptions) -> Result<Mesh, ObjError> {
    let file = File::open(path).map_err(|e| ObjError::Io(path.into(), e))?;
    let mesh = parse(BufReader::new(file), opts)?;
    debug!(
        "{}: {} vertices, {} triangles",
        path.display(),
        mesh.verts.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// `(position, texture coordinate, normal)` indices of one face corner, all zero based.
type Corner = (usize, Option<usize>, Option<usize>);

/// Parses the `v`, `vt`, `vn` and `f` statements of a Wavefront OBJ stream. Polygons are split into
/// triangle fans and corners sharing all three indices share a vertex.
pub fn parse<R: BufRead>(reader: R, opts: ObjOptions) -> Result<Mesh, ObjError> {
    let mut positions = Vec::<Vec3>::new();
    let mut tex_coords = Vec::<Vec2>::new();
    let mut normals = Vec::<Vec3>::new();

    let mut corners = HashMap::<Corner, u32>::new();
    let mut verts = Vec::<Vertex>::new();
    let mut indices = Vec::<u32>::new();
    let mut has_normals = true;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(ObjError::Read)?;
        let line_no = line_idx + 1;
        let err = |msg: String| ObjError::Parse { line: line_no, msg };

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => positions.push(Vec3::from_slice(&floats::<3>(tokens, 3).map_err(err)?)),
            // `vt u [v [w]]`, missing components are zero
            Some("vt") => tex_coords.push(Vec2::from_slice(&floats::<2>(tokens, 1).map_err(err)?)),
            Some("vn") => normals.push(Vec3::from_slice(&floats::<3>(tokens, 3).map_err(err)?)),
            Some("f") => {
                let face = tokens
                    .map(|token| {
                        parse_corner(token, positions.len(), tex_coords.len(), normals.len())
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(err)?;
                if face.len() < 3 {
                    return Err(err(format!("face with {} corners", face.len())));
                }

                let mut face_indices = Vec::with_capacity(face.len());
                for corner in face {
                    has_normals &= corner.2.is_some();
                    let index = *corners.entry(corner).or_insert_with(|| {
                        let (p, t, n) = corner;
                        verts.push(Vertex::new(
                            positions[p],
                            n.map_or(Vec3::ZERO, |n| normals[n]),
                            t.map_or(Vec2::ZERO, |t| tex_coords[t]),
                        ));
                        (verts.len() - 1) as u32
                    });
                    face_indices.push(index);
                }

                for k in 1..face_indices.len() - 1 {
                    indices.extend_from_slice(&[
                        face_indices[0],
                        face_indices[k],
                        face_indices[k + 1],
                    ]);
                }
            }
            // Groups, materials, smoothing and comments do not change the geometry
            _ => {}
        }
    }

    if indices.is_empty() {
        return Err(ObjError::Empty);
    }

    let mut mesh = Mesh::new(verts, indices);
    if !has_normals {
        mesh.compute_normals();
    }
    if opts.recenter {
        mesh.recenter();
    }
    if opts.tangents {
        mesh.compute_tangents();
    }
    Ok(mesh)
}

/// Reads up to `N` numbers, of which the first `required` must be present.
fn floats<'a, const N: usize>(
    mut tokens: impl Iterator<Item = &'a str>,
    required: usize,
) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for (i, value) in out.iter_mut().enumerate() {
        let Some(token) = tokens.next() else {
            if i < required {
                return Err(format!("expected {required} components"));
            }
            break;
        };
        *value = token
            .parse()
            .map_err(|e| format!("bad number {token:?}: {e}"))?;
    }
    Ok(out)
}

/// One of `v`, `v/t`, `v//n` or `v/t/n`.
fn parse_corner(
    token: &str,
    num_pos: usize,
    num_tex: usize,
    num_nrm: usize,
) -> Result<Corner, String> {
    let mut parts = token.split('/');
    let pos = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, num_pos)?,
        _ => return Err(format!("missing position index in {token:?}")),
    };
    let tex = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, num_tex)?),
        _ => None,
    };
    let nrm = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, num_nrm)?),
        _ => None,
    };
    Ok((pos, tex, nrm))
}

/// OBJ indices start at 1, negative ones count back from the most recent element.
fn resolve_index(token: &str, len: usize) -> Result<usize, String> {
    let index: i64 = token
        .parse()
        .map_err(|e| format!("bad index {token:?}: {e}"))?;
    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => (len as i64 + i).try_into().ok(),
    };
    resolved
        .filter(|&i| i < len)
        .ok_or_else(|| format!("index {index} out of range (have {len})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_str(src: &str, opts: ObjOptions) -> Result<Mesh, ObjError> {
        parse(Cursor::new(src), opts)
    }

    const QUAD: &str = "\
# unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl none
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_split_into_a_fan() {
        let mesh = parse_str(QUAD, ObjOptions::default()).unwrap();
        assert_eq!(mesh.verts.len(), 4);
        assert_eq!(mesh.indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.verts[2].tex(), Vec2::new(1.0, 1.0));
        assert!(mesh.verts.iter().all(|vtx| vtx.nrm() == Vec3::Z));
    }

    #[test]
    fn shared_corners_share_vertices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 3 2 4\n";
        let mesh = parse_str(src, ObjOptions::default()).unwrap();
        assert_eq!(mesh.verts.len(), 4);
        assert_eq!(mesh.indices, [0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn negative_and_normal_only_indices() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf -3//-1 -2//-1 -1//-1\n";
        let mesh = parse_str(src, ObjOptions::default()).unwrap();
        assert_eq!(mesh.verts[0].pos(), Vec3::ZERO);
        assert_eq!(mesh.verts[2].pos(), Vec3::Y);
        assert_eq!(mesh.verts[1].nrm(), Vec3::NEG_Z);
    }

    #[test]
    fn missing_normals_are_generated() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_str(src, ObjOptions::default()).unwrap();
        assert!(mesh.verts.iter().all(|vtx| vtx.nrm() == Vec3::Z));
    }

    #[test]
    fn recenter_and_tangents() {
        let mesh = parse_str(
            QUAD,
            ObjOptions {
                recenter: true,
                tangents: true,
            },
        )
        .unwrap();
        assert_eq!(mesh.verts[0].pos(), Vec3::new(-0.5, -0.5, 0.0));
        assert!(mesh.verts.iter().all(|vtx| vtx.tan[0] > 0.99));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let bad_index = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        match parse_str(bad_index, ObjOptions::default()) {
            Err(ObjError::Parse { line: 3, msg }) => assert!(msg.contains("out of range")),
            other => panic!("unexpected {other:?}"),
        }

        let bad_number = "v 0 zero 0\n";
        assert!(matches!(
            parse_str(bad_number, ObjOptions::default()),
            Err(ObjError::Parse { line: 1, .. })
        ));

        let short_face = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(
            parse_str(short_face, ObjOptions::default()),
            Err(ObjError::Parse { line: 3, .. })
        ));

        assert!(matches!(
            parse_str("v 0 0 0\n", ObjOptions::default()),
            Err(ObjError::Empty)
        ));
    }

    #[test]
    fn short_texture_coordinates_default_to_zero() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5\nvt 0.25 0.75 1\nf 1/1 2/1 3/2\n";
        let mesh = parse_str(src, ObjOptions::default()).unwrap();
        assert_eq!(mesh.verts[0].tex(), Vec2::new(0.5, 0.0));
        assert_eq!(mesh.verts[2].tex(), Vec2::new(0.25, 0.75));

        assert!(matches!(
            parse_str("vt\n", ObjOptions::default()),
            Err(ObjError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("v 0 0\n", ObjOptions::default()),
            Err(ObjError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn zero_index_is_rejected() {
        assert!(resolve_index("0", 4).is_err());
        assert_eq!(resolve_index("4", 4), Ok(3));
        assert_eq!(resolve_index("-4", 4), Ok(0));
        assert!(resolve_index("-5", 4).is_err());
    }
}
