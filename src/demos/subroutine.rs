use std::error::Error;

use eframe::glow;
use glam::{Mat4, Vec3, Vec4};
use log::warn;

use super::{
    lighting::{ads_white, PHONG_ORANGE},
    phong::{load_teapot, upright},
    Scene,
};
use crate::{
    config::Config,
    gfx::{
        camera::{Camera, Projection, Transforms},
        glutils::ExtraFns,
        shader::ShaderStage,
        Mesh, Model, Shader,
    },
};

const TEAPOT_OFFSET: f32 = 3.0;

/// Two teapots drawn by one program, the vertex stage switches between full ADS and diffuse
/// only shading through a subroutine uniform.
pub struct SubroutineScene {
    shader: Option<Shader>,
    teapot: Option<Mesh>,
    extra: ExtraFns,
    // [ads, diffuse]
    subroutines: [u32; 2],
    transforms: Transforms,
    projection: Projection,
}

/// Model matrix of the left (`side = -1`) or right (`side = 1`) teapot.
fn teapot_model(side: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(side * TEAPOT_OFFSET, -1.5, 0.0)) * upright()
}

impl SubroutineScene {
    pub fn new() -> Self {
        let mut camera = Camera::new()
            .with_eye(Vec3::new(0.0, 0.0, 10.0))
            .with_target(Vec3::ZERO);

        Self {
            shader: None,
            teapot: None,
            extra: ExtraFns::default(),
            subroutines: [0; 2],
            transforms: Transforms {
                view: camera.get_mtx(),
                ..Default::default()
            },
            projection: Projection::perspective(70.0),
        }
    }
}

impl Scene for SubroutineScene {
    fn name(&self) -> &'static str {
        "Subroutine"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        self.extra = *extra;

        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "subroutine")?);
        shader.use_program(gl);

        self.subroutines = [
            shader.subroutine_index(extra, ShaderStage::Vertex, "phongModel")?,
            shader.subroutine_index(extra, ShaderStage::Vertex, "diffuseOnly")?,
        ];

        self.teapot.insert(load_teapot(config)?).setup_gl(gl)?;

        ads_white(Vec4::new(0.0, 0.0, 0.0, 1.0)).apply(gl, shader);
        PHONG_ORANGE.apply(gl, shader);

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(shader) = self.shader.take() {
            shader.destroy(gl);
        }
        if let Some(mut teapot) = self.teapot.take() {
            teapot.destroy_gl(gl);
        }
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let (Some(shader), Some(teapot)) = (&self.shader, &self.teapot) else {
            return;
        };
        shader.use_program(gl);

        let [ads, diffuse] = self.subroutines;
        for (side, subroutine) in [(-1.0, ads), (1.0, diffuse)] {
            let selected = shader.select_subroutines(&self.extra, ShaderStage::Vertex, &[subroutine]);
            if let Err(e) = selected {
                warn!("{e}");
                return;
            }
            self.transforms.model = teapot_model(side);
            self.transforms.set_matrices(gl, shader);
            teapot.draw(gl);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teapots_sit_either_side_of_the_origin() {
        let left = teapot_model(-1.0).transform_point3(Vec3::ZERO);
        let right = teapot_model(1.0).transform_point3(Vec3::ZERO);
        assert_eq!(left, Vec3::new(-3.0, -1.5, 0.0));
        assert_eq!(right, Vec3::new(3.0, -1.5, 0.0));
    }
}
