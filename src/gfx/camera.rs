use eframe::glow;
use glam::{self, Mat3, Mat4, Vec3};

use super::shader::{Shader, ShaderUniformTypes};

#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,

    mtx: Mat4,
    dirty: bool,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Creation Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    pub fn new() -> Self {
        Self {
            eye: Vec3::Z,
            target: Vec3::ZERO,
            up: Vec3::Y,

            mtx: Mat4::IDENTITY,
            dirty: true,
        }
    }

    pub fn with_eye(mut self, eye: Vec3) -> Self {
        self.eye = eye;
        self.dirty = true;
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self.dirty = true;
        self
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Usability Functions                                                  //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Camera {
    /// Puts the eye on a horizontal circle around the target: `(r cos a, height, r sin a)`.
    pub fn orbit(&mut self, angle: f32, radius: f32, height: f32) {
        self.eye = self.target + Vec3::new(radius * angle.cos(), height, radius * angle.sin());
        self.dirty = true;
    }

    pub fn get_mtx(&mut self) -> Mat4 {
        if self.dirty {
            self.mtx = Mat4::look_at_rh(self.eye, self.target, self.up);
            self.dirty = false;
        }

        self.mtx
    }

    pub fn get_eye(&self) -> Vec3 {
        self.eye
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                                 Projection                                                        //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fovy_degrees: f32,
        near: f32,
        far: f32,
    },
    Ortho {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub const fn perspective(fovy_degrees: f32) -> Self {
        Self::Perspective {
            fovy_degrees,
            near: 0.3,
            far: 100.0,
        }
    }

    /// A 4:3 box scaled by `c`, the shape every orthographic demo uses.
    pub fn ortho_box(c: f32) -> Self {
        Self::Ortho {
            left: -0.4 * c,
            right: 0.4 * c,
            bottom: -0.3 * c,
            top: 0.3 * c,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn matrix(&self, width: u32, height: u32) -> Mat4 {
        match *self {
            Self::Perspective {
                fovy_degrees,
                near,
                far,
            } => {
                let aspect = width.max(1) as f32 / height.max(1) as f32;
                Mat4::perspective_rh_gl(fovy_degrees.to_radians(), aspect, near, far)
            }
            Self::Ortho {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_gl(left, right, bottom, top, near, far),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Per Draw Matrices                                                   //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl Transforms {
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_view())
    }

    pub fn mvp(&self) -> Mat4 {
        self.projection * self.model_view()
    }

    /// Uploads `ModelViewMatrix`, `NormalMatrix` and `MVP`.
    pub fn set_matrices(&self, gl: &glow::Context, shader: &Shader) {
        let mv = self.model_view();
        shader.set_uniform(gl, "ModelViewMatrix", ShaderUniformTypes::Mat4(&mv));
        shader.set_uniform(
            gl,
            "NormalMatrix",
            ShaderUniformTypes::Mat3(&Mat3::from_mat4(mv)),
        );
        shader.set_uniform(gl, "MVP", ShaderUniformTypes::Mat4(&(self.projection * mv)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let mut cam = Camera::new().with_eye(Vec3::new(0.0, 0.0, 5.0));
        let target = cam.get_mtx() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((target - Vec4::new(0.0, 0.0, -5.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn orbit_follows_the_circle() {
        let mut cam = Camera::new();
        cam.orbit(std::f32::consts::FRAC_PI_2, 3.0, 0.0);
        assert!((cam.get_eye() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);

        // The cached matrix is rebuilt after moving
        let before = cam.get_mtx();
        cam.orbit(0.0, 3.0, 0.0);
        assert_ne!(before, cam.get_mtx());
    }

    #[test]
    fn perspective_uses_viewport_aspect() {
        let proj = Projection::perspective(60.0);
        let wide = proj.matrix(800, 400);
        let square = proj.matrix(400, 400);
        assert!((wide.x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-5);
        assert_eq!(wide.y_axis.y, square.y_axis.y);

        // A collapsed viewport must not produce NaNs
        assert!(!proj.matrix(0, 0).is_nan());
    }

    #[test]
    fn ortho_box_maps_corners_to_ndc() {
        let proj = Projection::ortho_box(2.0).matrix(800, 600);
        let corner = proj * Vec4::new(0.8, 0.6, -0.1, 1.0);
        assert!((corner.truncate() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn normal_matrix_is_upper_left_of_model_view() {
        let transforms = Transforms {
            model: Mat4::from_rotation_x(-90f32.to_radians()),
            view: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            projection: Mat4::IDENTITY,
        };
        let mv = transforms.model_view();
        let nm = transforms.normal_matrix();
        assert_eq!(nm.x_axis, mv.x_axis.truncate());
        assert_eq!(nm.y_axis, mv.y_axis.truncate());
        assert_eq!(nm.z_axis, mv.z_axis.truncate());
        assert_eq!(transforms.mvp(), mv);
    }
}
