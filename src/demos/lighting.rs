use eframe::glow;
use glam::{Vec3, Vec4};

use crate::gfx::{shader::ShaderUniformTypes, Shader};

/// `Material.Ka/Kd/Ks/Shininess` block shared by the lit shaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ka: Vec3,
    pub kd: Vec3,
    pub ks: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn apply(&self, gl: &glow::Context, shader: &Shader) {
        shader.set_uniform(gl, "Material.Ka", ShaderUniformTypes::Vec3(&self.ka));
        shader.set_uniform(gl, "Material.Kd", ShaderUniformTypes::Vec3(&self.kd));
        shader.set_uniform(gl, "Material.Ks", ShaderUniformTypes::Vec3(&self.ks));
        shader.set_uniform(
            gl,
            "Material.Shininess",
            ShaderUniformTypes::F32(&self.shininess),
        );
    }
}

/// Light uniforms. `position` is always in eye coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// `Light.Position` + `Light.Intensity`, used by the per-fragment shaders.
    Single { position: Vec4, intensity: Vec3 },
    /// Separate ambient, diffuse and specular intensities, used by the per-vertex shaders.
    Ads {
        position: Vec4,
        la: Vec3,
        ld: Vec3,
        ls: Vec3,
    },
}

impl Light {
    pub fn apply(&self, gl: &glow::Context, shader: &Shader) {
        match self {
            Self::Single {
                position,
                intensity,
            } => {
                shader.set_uniform(gl, "Light.Position", ShaderUniformTypes::Vec4(position));
                shader.set_uniform(gl, "Light.Intensity", ShaderUniformTypes::Vec3(intensity));
            }
            Self::Ads {
                position,
                la,
                ld,
                ls,
            } => {
                shader.set_uniform(gl, "Light.Position", ShaderUniformTypes::Vec4(position));
                shader.set_uniform(gl, "Light.La", ShaderUniformTypes::Vec3(la));
                shader.set_uniform(gl, "Light.Ld", ShaderUniformTypes::Vec3(ld));
                shader.set_uniform(gl, "Light.Ls", ShaderUniformTypes::Vec3(ls));
            }
        }
    }
}

pub const PHONG_ORANGE: Material = Material {
    ka: Vec3::new(0.9, 0.5, 0.3),
    kd: Vec3::new(0.9, 0.5, 0.3),
    ks: Vec3::new(0.8, 0.8, 0.8),
    shininess: 100.0,
};

pub const TEXTURED: Material = Material {
    ka: Vec3::new(0.1, 0.1, 0.1),
    kd: Vec3::new(0.9, 0.9, 0.9),
    ks: Vec3::new(0.95, 0.95, 0.95),
    shininess: 100.0,
};

/// White light with a dim ambient term.
pub fn ads_white(position: Vec4) -> Light {
    Light::Ads {
        position,
        la: Vec3::splat(0.4),
        ld: Vec3::ONE,
        ls: Vec3::ONE,
    }
}
