use glam::{Vec2, Vec3, Vec4};
use zerocopy::AsBytes;

/// Interleaved vertex as it is laid out in the array buffer.
/// Attribute locations: 0 position, 1 normal, 2 texture coordinate, 3 tangent.
#[derive(Debug, Clone, Copy, Default, PartialEq, AsBytes)]
#[repr(C)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
    pub tex: [f32; 2],
    pub tan: [f32; 4],
}

impl Vertex {
    pub fn new(pos: Vec3, nrm: Vec3, tex: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            nrm: nrm.normalize_or_zero().to_array(),
            tex: tex.to_array(),
            tan: [0.0; 4],
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::from_array(self.pos)
    }

    pub fn nrm(&self) -> Vec3 {
        Vec3::from_array(self.nrm)
    }

    pub fn tex(&self) -> Vec2 {
        Vec2::from_array(self.tex)
    }

    pub fn tan(&self) -> Vec4 {
        Vec4::from_array(self.tan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(size_of::<Vertex>(), 12 * size_of::<f32>());
        assert_eq!(Vertex::default().as_bytes().len(), 48);
    }

    #[test]
    fn normal_is_normalized() {
        let vtx = Vertex::new(Vec3::ONE, Vec3::new(0.0, 3.0, 0.0), Vec2::ZERO);
        assert_eq!(vtx.nrm(), Vec3::Y);

        let degenerate = Vertex::new(Vec3::ONE, Vec3::ZERO, Vec2::ZERO);
        assert_eq!(degenerate.nrm(), Vec3::ZERO);
    }
}
