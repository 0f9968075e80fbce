use std::error::Error;

use eframe::glow;
use glam::{Mat4, Vec3, Vec4};

use super::{
    lighting::{Light, TEXTURED},
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
    shapes,
};

/// A single brick textured cube lit from the eye.
pub struct TextureScene {
    shader: Option<Shader>,
    cube: Mesh,
    texture: Option<Texture>,
    transforms: Transforms,
    projection: Projection,
}

impl TextureScene {
    pub fn new() -> Self {
        let mut camera = Camera::new()
            .with_eye(Vec3::new(1.0, 1.25, 1.25))
            .with_target(Vec3::ZERO);

        Self {
            shader: None,
            cube: shapes::cube(1.0),
            texture: None,
            transforms: Transforms {
                view: camera.get_mtx(),
                ..Default::default()
            },
            projection: Projection::perspective(70.0),
        }
    }
}

impl Scene for TextureScene {
    fn name(&self) -> &'static str {
        "Texture"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "texture")?);
        shader.use_program(gl);

        self.cube.setup_gl(gl)?;

        let texture = self.texture.insert(Texture::from_file(
            gl,
            &config.media_path("brick1.jpg"),
            0,
            TextureOptions::default(),
        )?);
        shader.set_uniform(gl, "Tex1", ShaderUniformTypes::I32(&(texture.unit() as i32)));

        Light::Single {
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            intensity: Vec3::ONE,
        }
        .apply(gl, shader);
        TEXTURED.apply(gl, shader);

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(shader) = self.shader.take() {
            shader.destroy(gl);
        }
        if let Some(texture) = self.texture.take() {
            texture.destroy(gl);
        }
        self.cube.destroy_gl(gl);
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let (Some(shader), Some(texture)) = (&self.shader, &self.texture) else {
            return;
        };
        shader.use_program(gl);
        texture.bind(gl);

        self.transforms.model = Mat4::IDENTITY;
        self.transforms.set_matrices(gl, shader);
        self.cube.draw(gl);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }
}
