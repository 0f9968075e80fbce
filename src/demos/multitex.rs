use std::error::Error;

use eframe::glow;
use glam::{Vec3, Vec4};

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

/// A static brick cube with a layer of moss blended on top by the moss alpha channel.
pub struct MultiTexScene {
    shader: Option<Shader>,
    cube: Mesh,
    textures: Vec<Texture>,
    transforms: Transforms,
    projection: Projection,
}

impl MultiTexScene {
    pub fn new() -> Self {
        let mut camera = Camera::new()
            .with_eye(Vec3::new(1.0, 1.25, 1.25))
            .with_target(Vec3::ZERO);

        Self {
            shader: None,
            cube: shapes::cube(1.0),
            textures: Vec::new(),
            transforms: Transforms {
                view: camera.get_mtx(),
                ..Default::default()
            },
            projection: Projection::perspective(60.0),
        }
    }
}

impl Scene for MultiTexScene {
    fn name(&self) -> &'static str {
        "Multitexture"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "multitex")?);
        shader.use_program(gl);

        self.cube.setup_gl(gl)?;

        for (unit, (file, sampler)) in [("brick1.jpg", "BrickTex"), ("moss.png", "MossTex")]
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
        self.textures.drain(..).for_each(|texture| texture.destroy(gl));
        self.cube.destroy_gl(gl);
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let Some(shader) = &self.shader else {
            return;
        };
        shader.use_program(gl);
        self.textures.iter().for_each(|texture| texture.bind(gl));

        self.transforms.set_matrices(gl, shader);
        self.cube.draw(gl);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn cube_does_not_move() {
        let mut scene = MultiTexScene::new();
        let before = scene.transforms;
        scene.update(10.0);
        assert_eq!(scene.transforms, before);
        assert_eq!(scene.transforms.model, Mat4::IDENTITY);
    }
}
