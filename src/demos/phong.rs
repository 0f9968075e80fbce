use std::error::Error;

use eframe::glow;
use glam::{Mat4, Vec3, Vec4};

use super::{
    lighting::{ads_white, PHONG_ORANGE},
    Scene,
};
use crate::{
    config::Config,
    gfx::{
        camera::{Camera, Projection, Transforms},
        glutils::ExtraFns,
        Mesh, Model, Shader,
    },
    shapes::{
        self,
        obj::{self, ObjOptions},
    },
};

pub const WORLD_LIGHT: Vec4 = Vec4::new(5.0, 5.0, 2.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Teapot,
    Torus,
}

/// Per-vertex ADS shading on either a teapot or a torus, Space switches between them.
pub struct PhongScene {
    shader: Option<Shader>,
    teapot: Option<Mesh>,
    torus: Mesh,
    current: Shape,
    transforms: Transforms,
    projection: Projection,
}

/// The teapot is modelled Z-up, every demo stands it upright.
pub fn upright() -> Mat4 {
    Mat4::from_rotation_x(-90f32.to_radians())
}

pub fn phong_view() -> Mat4 {
    Camera::new()
        .with_eye(Vec3::new(0.0, 3.0, 5.0))
        .with_target(Vec3::new(0.0, 0.75, 0.0))
        .get_mtx()
}

pub fn load_teapot(config: &Config) -> Result<Mesh, Box<dyn Error>> {
    Ok(obj::load(
        &config.media_path("teapot.obj"),
        ObjOptions::default(),
    )?)
}

impl PhongScene {
    pub fn new() -> Self {
        Self {
            shader: None,
            teapot: None,
            torus: shapes::torus(1.75, 0.75, 50, 50),
            current: Shape::Teapot,
            transforms: Transforms {
                model: upright(),
                view: phong_view(),
                projection: Mat4::IDENTITY,
            },
            projection: Projection::perspective(70.0),
        }
    }
}

impl Scene for PhongScene {
    fn name(&self) -> &'static str {
        "Phong"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "phong")?);
        shader.use_program(gl);

        self.teapot.insert(load_teapot(config)?).setup_gl(gl)?;
        self.torus.setup_gl(gl)?;

        ads_white(self.transforms.view * WORLD_LIGHT).apply(gl, shader);
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
        self.torus.destroy_gl(gl);
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let Some(shader) = &self.shader else {
            return;
        };
        shader.use_program(gl);
        self.transforms.set_matrices(gl, shader);

        match self.current {
            Shape::Teapot => {
                if let Some(teapot) = &self.teapot {
                    teapot.draw(gl);
                }
            }
            Shape::Torus => self.torus.draw(gl),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }

    fn on_key(&mut self, key: egui::Key) {
        if key == egui::Key::Space {
            self.current = match self.current {
                Shape::Teapot => Shape::Torus,
                Shape::Torus => Shape::Teapot,
            };
        }
    }

    fn status(&self) -> Option<String> {
        let shape = match self.current {
            Shape::Teapot => "Teapot",
            Shape::Torus => "Torus",
        };
        Some(format!("{shape} (Space to switch)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_toggles_the_shape() {
        let mut scene = PhongScene::new();
        assert_eq!(scene.current, Shape::Teapot);

        scene.on_key(egui::Key::Space);
        assert_eq!(scene.current, Shape::Torus);
        assert_eq!(scene.status().as_deref(), Some("Torus (Space to switch)"));

        scene.on_key(egui::Key::A);
        assert_eq!(scene.current, Shape::Torus);

        scene.on_key(egui::Key::Space);
        assert_eq!(scene.current, Shape::Teapot);
    }

    #[test]
    fn upright_turns_z_up_into_y_up() {
        let up = upright().transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-6);
    }
}
