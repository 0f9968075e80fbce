pub mod bezcurve;
pub mod lighting;
pub mod multitex;
pub mod normalmap;
pub mod phong;
pub mod phong_teapot;
pub mod pointsprite;
pub mod subroutine;
pub mod texture;

use std::{error::Error, f32::consts::TAU};

use eframe::glow;

use crate::{config::Config, gfx::glutils::ExtraFns};

/// One self contained demo. GL objects only exist between `init_gl` and `destroy_gl`; `destroy_gl` must cope
/// with a partially initialised scene since it is also used to clean up after a failed `init_gl`.
pub trait Scene: Send {
    fn name(&self) -> &'static str;

    fn init_gl(
        &mut self,
        gl: &glow::Context,
        config: &Config,
        extra: &ExtraFns,
    ) -> Result<(), Box<dyn Error>>;
    fn destroy_gl(&mut self, gl: &glow::Context);

    /// Advances the animation by `dt` seconds.
    fn update(&mut self, dt: f32);
    fn render(&mut self, gl: &glow::Context);
    fn resize(&mut self, width: u32, height: u32);

    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }

    fn on_key(&mut self, key: egui::Key) {
        let _ = key;
    }

    /// Extra line shown under the demo list, e.g. which shape is on screen.
    fn status(&self) -> Option<String> {
        None
    }
}

pub fn all_scenes() -> Vec<Box<dyn Scene>> {
    vec![
        Box::new(texture::TextureScene::new()),
        Box::new(multitex::MultiTexScene::new()),
        Box::new(normalmap::NormalMapScene::new()),
        Box::new(pointsprite::PointSpriteScene::new()),
        Box::new(phong::PhongScene::new()),
        Box::new(phong_teapot::PhongTeapotScene::new()),
        Box::new(subroutine::SubroutineScene::new()),
        Box::new(bezcurve::BezCurveScene::new()),
    ]
}

/// Advances `angle` by `rate * dt`, keeping it in `[0, 2π)`.
pub fn advance_angle(angle: f32, rate: f32, dt: f32) -> f32 {
    (angle + rate * dt).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_wraps() {
        assert_eq!(advance_angle(1.0, 0.5, 2.0), 2.0);
        assert!((advance_angle(TAU - 0.1, 1.0, 0.2) - 0.1).abs() < 1e-5);
        let many_turns = advance_angle(0.0, 60.0, 10.0);
        assert!((0.0..TAU).contains(&many_turns));
    }

    #[test]
    fn scene_names_are_unique() {
        let scenes = all_scenes();
        let mut names: Vec<_> = scenes.iter().map(|scene| scene.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), scenes.len());
    }
}
