use std::error::Error;

use eframe::glow;
use glam::{Mat4, Vec3, Vec4};

use super::{
    advance_angle,
    lighting::{Light, Material},
    Scene,
};
use crate::{
    config::Config,
    gfx::{
        camera::{Camera, Projection, Transforms},
        glutils::ExtraFns,
        shader::ShaderUniformTypes,
        texture::TextureOptions,
        Mesh, Model, Shader, Texture,
    },
    shapes::obj::{self, ObjOptions},
};

const LIGHT_ORBIT_RATE: f32 = 0.006;
const LIGHT_ORBIT_RADIUS: f32 = 10.0;
const LIGHT_INTENSITY: Vec3 = Vec3::splat(0.9);

const SKIN: Material = Material {
    ka: Vec3::new(0.1, 0.1, 0.1),
    // Diffuse reflectivity comes from the color texture
    kd: Vec3::ZERO,
    ks: Vec3::new(0.2, 0.2, 0.2),
    shininess: 1.0,
};

/// Ogre head lit in tangent space with a normal map, the light slowly circles around it.
pub struct NormalMapScene {
    shader: Option<Shader>,
    mesh: Option<Mesh>,
    textures: Vec<Texture>,
    transforms: Transforms,
    projection: Projection,
    angle: f32,
}

impl NormalMapScene {
    pub fn new() -> Self {
        let mut camera = Camera::new()
            .with_eye(Vec3::new(-1.0, 0.25, 2.0))
            .with_target(Vec3::ZERO);

        Self {
            shader: None,
            mesh: None,
            textures: Vec::new(),
            transforms: Transforms {
                view: camera.get_mtx(),
                ..Default::default()
            },
            projection: Projection::ortho_box(2.0),
            angle: 100f32.to_radians(),
        }
    }

    /// Light position in eye coordinates.
    fn light_position(&self) -> Vec4 {
        let world = Vec4::new(
            LIGHT_ORBIT_RADIUS * self.angle.cos(),
            1.0,
            LIGHT_ORBIT_RADIUS * self.angle.sin(),
            1.0,
        );
        self.transforms.view * world
    }
}

impl Scene for NormalMapScene {
    fn name(&self) -> &'static str {
        "Normal Map"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "normalmap")?);
        shader.use_program(gl);

        let mesh = obj::load(
            &config.media_path("bs_ears.obj"),
            ObjOptions {
                recenter: false,
                tangents: true,
            },
        )?;
        self.mesh.insert(mesh).setup_gl(gl)?;

        for (unit, (file, sampler)) in [
            ("ogre_diffuse.png", "ColorTex"),
            ("ogre_normalmap.png", "NormalMapTex"),
        ]
        .into_iter()
        .enumerate()
        {
            let texture = Texture::from_file(
                gl,
                &config.media_path(file),
                unit as u32,
                TextureOptions::default(),
            )?;
            self.textures.push(texture);
            shader.set_uniform(gl, sampler, ShaderUniformTypes::I32(&(unit as i32)));
        }

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(shader) = self.shader.take() {
            shader.destroy(gl);
        }
        self.textures.drain(..).for_each(|texture| texture.destroy(gl));
        if let Some(mut mesh) = self.mesh.take() {
            mesh.destroy_gl(gl);
        }
    }

    fn update(&mut self, dt: f32) {
        self.angle = advance_angle(self.angle, LIGHT_ORBIT_RATE, dt);
    }

    fn render(&mut self, gl: &glow::Context) {
        let (Some(shader), Some(mesh)) = (&self.shader, &self.mesh) else {
            return;
        };
        shader.use_program(gl);
        self.textures.iter().for_each(|texture| texture.bind(gl));

        Light::Single {
            position: self.light_position(),
            intensity: LIGHT_INTENSITY,
        }
        .apply(gl, shader);
        SKIN.apply(gl, shader);

        self.transforms.model = Mat4::IDENTITY;
        self.transforms.set_matrices(gl, shader);
        mesh.draw(gl);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_starts_on_its_orbit() {
        let mut scene = NormalMapScene::new();
        let mut camera = Camera::new()
            .with_eye(Vec3::new(-1.0, 0.25, 2.0))
            .with_target(Vec3::ZERO);
        let world = camera.get_mtx().inverse() * scene.light_position();
        assert!((world.truncate().length() - 101f32.sqrt()).abs() < 1e-3);
        assert!(world.z > 9.0);

        scene.update(1.0);
        assert!((scene.angle - (100f32.to_radians() + LIGHT_ORBIT_RATE)).abs() < 1e-6);
    }
}
