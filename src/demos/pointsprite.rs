use std::{error::Error, f32::consts::FRAC_PI_2};

use eframe::glow;
use glam::{Mat4, Vec3};
use rand::Rng;

use super::{advance_angle, Scene};
use crate::{
    config::Config,
    gfx::{
        camera::{Camera, Projection, Transforms},
        glutils::ExtraFns,
        shader::ShaderUniformTypes,
        texture::TextureOptions,
        Model, PointBuffer, Shader, Texture,
    },
};

const NUM_SPRITES: usize = 50;
const SPRITE_HALF_SIZE: f32 = 0.15;
const ORBIT_RATE: f32 = 0.06;
const ORBIT_RADIUS: f32 = 3.0;

/// Random points in the `[-1, 1]` cube, expanded into textured quads by a geometry shader.
pub struct PointSpriteScene {
    shader: Option<Shader>,
    sprites: PointBuffer,
    texture: Option<Texture>,
    camera: Camera,
    transforms: Transforms,
    projection: Projection,
    angle: f32,
}

pub fn random_locations<R: Rng>(rng: &mut R, count: usize) -> Vec<[f32; 3]> {
    (0..count)
        .map(|_| {
            [
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            ]
        })
        .collect()
}

impl PointSpriteScene {
    pub fn new() -> Self {
        let locations = random_locations(&mut rand::thread_rng(), NUM_SPRITES);

        Self {
            shader: None,
            sprites: PointBuffer::new(locations, glow::POINTS),
            texture: None,
            camera: Camera::new().with_target(Vec3::ZERO),
            transforms: Transforms::default(),
            projection: Projection::perspective(60.0),
            angle: FRAC_PI_2,
        }
    }
}

impl Scene for PointSpriteScene {
    fn name(&self) -> &'static str {
        "Point Sprites"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let shader = self
            .shader
            .insert(Shader::from_stem(gl, &config.shader_dir, "pointsprite")?);
        shader.use_program(gl);

        self.sprites.setup_gl(gl)?;

        let texture = self.texture.insert(Texture::from_file(
            gl,
            &config.media_path("flower.png"),
            0,
            TextureOptions::default(),
        )?);
        shader.set_uniform(
            gl,
            "SpriteTex",
            ShaderUniformTypes::I32(&(texture.unit() as i32)),
        );
        shader.set_uniform(gl, "Size2", ShaderUniformTypes::F32(&SPRITE_HALF_SIZE));

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        if let Some(shader) = self.shader.take() {
            shader.destroy(gl);
        }
        if let Some(texture) = self.texture.take() {
            texture.destroy(gl);
        }
        self.sprites.destroy_gl(gl);
    }

    fn update(&mut self, dt: f32) {
        self.angle = advance_angle(self.angle, ORBIT_RATE, dt);
    }

    fn render(&mut self, gl: &glow::Context) {
        let (Some(shader), Some(texture)) = (&self.shader, &self.texture) else {
            return;
        };
        shader.use_program(gl);
        texture.bind(gl);

        self.camera.orbit(self.angle, ORBIT_RADIUS, 0.0);
        self.transforms.view = self.camera.get_mtx();
        self.transforms.model = Mat4::IDENTITY;

        // The geometry shader builds the quads in eye space, so it gets the projection on its own
        shader.set_uniform(
            gl,
            "ModelViewMatrix",
            ShaderUniformTypes::Mat4(&self.transforms.model_view()),
        );
        shader.set_uniform(
            gl,
            "ProjectionMatrix",
            ShaderUniformTypes::Mat4(&self.transforms.projection),
        );

        self.sprites.draw(gl);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.transforms.projection = self.projection.matrix(width, height);
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.5, 0.5, 0.5, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn locations_stay_in_the_unit_cube() {
        let locations = random_locations(&mut StdRng::seed_from_u64(7), 500);
        assert_eq!(locations.len(), 500);
        assert!(locations
            .iter()
            .flatten()
            .all(|c| (-1.0..=1.0).contains(c)));
    }

    #[test]
    fn camera_starts_on_the_z_axis() {
        let mut scene = PointSpriteScene::new();
        assert_eq!(scene.sprites.points.len(), NUM_SPRITES);

        scene.camera.orbit(scene.angle, ORBIT_RADIUS, 0.0);
        assert!((scene.camera.get_eye() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
    }
}
