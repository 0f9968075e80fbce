use std::error::Error;

use eframe::glow;
use glam::{Vec3, Vec4};

use super::Scene;
use crate::{
    config::Config,
    gfx::{
        camera::{Camera, Projection, Transforms},
        glutils::ExtraFns,
        shader::ShaderUniformTypes,
        Model, PointBuffer, Shader,
    },
};

pub const CONTROL_POINTS: [[f32; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [-0.5, 1.0, 0.0],
    [0.5, -1.0, 0.0],
    [1.0, 1.0, 0.0],
];

const NUM_SEGMENTS: i32 = 50;
const NUM_STRIPS: i32 = 1;
const LINE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.5, 1.0);
const POINT_COLOR: Vec4 = Vec4::new(0.5, 1.0, 1.0, 1.0);

/// A cubic Bezier curve evaluated by the tessellation stages, with its control points on top.
pub struct BezCurveScene {
    curve: Option<Shader>,
    solid: Option<Shader>,
    points: PointBuffer,
    transforms: Transforms,
    projection: Projection,
}

impl BezCurveScene {
    pub fn new() -> Self {
        let mut camera = Camera::new()
            .with_eye(Vec3::new(0.0, 0.0, 1.5))
            .with_target(Vec3::ZERO);

        Self {
            curve: None,
            solid: None,
            points: PointBuffer::new(CONTROL_POINTS.to_vec(), glow::PATCHES),
            transforms: Transforms {
                view: camera.get_mtx(),
                ..Default::default()
            },
            projection: Projection::ortho_box(3.5),
        }
    }
}

impl Scene for BezCurveScene {
    fn name(&self) -> &'static str {
        "Bezier Curve"
    }

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        _extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>> {
        let curve = self
            .curve
            .insert(Shader::from_stem(gl, &config.shader_dir, "bezcurve")?);
        curve.use_program(gl);
        curve.set_uniform(gl, "NumSegments", ShaderUniformTypes::I32(&NUM_SEGMENTS));
        curve.set_uniform(gl, "NumStrips", ShaderUniformTypes::I32(&NUM_STRIPS));
        curve.set_uniform(gl, "LineColor", ShaderUniformTypes::Vec4(&LINE_COLOR));

        let solid = self
            .solid
            .insert(Shader::from_stem(gl, &config.shader_dir, "solid")?);
        solid.use_program(gl);
        solid.set_uniform(gl, "Color", ShaderUniformTypes::Vec4(&POINT_COLOR));

        self.points.setup_gl(gl)?;

        Ok(())
    }

    fn destroy_gl(&mut self, gl: &glow::Context) {
        for shader in [self.curve.take(), self.solid.take()].into_iter().flatten() {
            shader.destroy(gl);
        }
        self.points.destroy_gl(gl);
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, gl: &glow::Context) {
        let (Some(curve), Some(solid)) = (&self.curve, &self.solid) else {
            return;
        };
        let mvp = self.transforms.mvp();

        // Curve
        curve.use_program(gl);
        curve.set_uniform(gl, "MVP", ShaderUniformTypes::Mat4(&mvp));
        unsafe {
            use glow::HasContext as _;
            gl.patch_parameter_i32(glow::PATCH_VERTICES, CONTROL_POINTS.len() as i32);
        }
        self.points.draw(gl);

        // Control points
        solid.use_program(gl);
        solid.set_uniform(gl, "MVP", ShaderUniformTypes::Mat4(&mvp));
        unsafe {
            use glow::HasContext as _;
            gl.enable(glow::PROGRAM_POINT_SIZE);
        }
        self.points.draw_as(gl, glow::POINTS);
        unsafe {
            use glow::HasContext as _;
            gl.disable(glow::PROGRAM_POINT_SIZE);
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
    fn control_points_fit_on_screen() {
        let mut scene = BezCurveScene::new();
        scene.resize(800, 600);
        let mvp = scene.transforms.mvp();
        for point in CONTROL_POINTS {
            let clip = mvp * Vec4::from((Vec3::from(point), 1.0));
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.abs().cmple(Vec3::ONE).all(), "{point:?} -> {ndc}");
        }
    }
}
