use std::error::Error;

use eframe::glow;
use glam::{Mat4, Vec3};

use super::{
    lighting::{ads_white, Material, PHONG_ORANGE},
    phong::{load_teapot, phong_view, upright, WORLD_LIGHT},
    Scene,
};
use crate::{
    config::Config,
    gfx::{
        camera::{Projection, Transforms},
        glutils::ExtraFns,
        Mesh, Model, Shader,
    },
    shapes,
};

const FLOOR_HEIGHT: f32 = -0.45;

const FLOOR: Material = Material {
    ka: Vec3::new(0.1, 0.1, 0.1),
    kd: Vec3::new(0.7, 0.7, 0.7),
    ks: Vec3::new(0.8, 0.8, 0.8),
    shininess: 180.0,
};

/// The Phong teapot standing on a large grey floor.
pub struct PhongTeapotScene {
    shader: Option<Shader>,
    teapot: Option<Mesh>,
    floor: Mesh,
    transforms: Transforms,
    projection: Projection,
}

impl PhongTeapotScene {
    pub fn new() -> Self {
        Self {
            shader: None,
            teapot: None,
            floor: shapes::plane(50.0, 50.0, 1, 1),
            transforms: Transforms {
                view: phong_view(),
                ..Default::default()
            },
            projection: Projection::perspective(70.0),
        }
    }
}

impl Scene for PhongTeapotScene {
    fn name(&self) -> &'static str {
        "Phong Teapot"
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
        self.floor.setup_gl(gl)?;

        ads_white(self.transforms.view * WORLD_LIGHT).apply(gl, shader);

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(shader) = self.shader.take() {
            shader.destroy(gl);
        }
        if let Some(mut teapot) = self.teapot.take() {
            teapot.destroy_gl(gl);
        }
        self.floor.destroy_gl(gl);
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let (Some(shader), Some(teapot)) = (&self.shader, &self.teapot) else {
            return;
        };
        shader.use_program(gl);

        PHONG_ORANGE.apply(gl, shader);
        self.transforms.model = upright();
        self.transforms.set_matrices(gl, shader);
        teapot.draw(gl);

        FLOOR.apply(gl, shader);
        self.transforms.model = Mat4::from_translation(Vec3::new(0.0, FLOOR_HEIGHT, 0.0));
        self.transforms.set_matrices(gl, shader);
        self.floor.draw(gl);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }
}
