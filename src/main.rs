#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(unsafe_code)]
#![allow(clippy::undocumented_unsafe_blocks)]

use eframe::{egui, egui_glow, glow};
use egui::mutex::Mutex;
use egui::panel::Side;
use egui::{Color32, Id};
use log::{error, info, warn};

use std::error::Error;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod demos;
mod gfx;
mod shapes;

use config::Config;
use demos::Scene;
use gfx::glutils::{self, ExtraFns};

const WIDTH: f32 = 1050f32;
const HEIGHT: f32 = 600f32;

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([WIDTH, HEIGHT]),
        multisampling: 4,
        depth_buffer: 24,

        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        "GLSL Gallery",
        options,
        Box::new(|cc| Ok(Box::new(GalleryApp::new(cc)?))),
    )
}

struct GalleryApp {
    /// Behind an `Arc<Mutex<…>>` so we can pass it to [`egui::PaintCallback`] and paint later.
    scenes: Vec<Arc<Mutex<Box<dyn Scene>>>>,
    /// Last init failure of every scene, shown under its name.
    errors: Vec<Option<String>>,
    selected_scene: Option<usize>,
    config: Config,
    extra: ExtraFns,
    wireframe: bool,
    paused: bool,
    speed: f32,
    screenshot_requested: bool,
}

impl GalleryApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let gl = cc
            .gl
            .as_ref()
            .ok_or("You need to run eframe with the glow backend")?;

        glutils::dump_gl_info(gl, log::log_enabled!(log::Level::Debug));
        let extra = match &cc.get_proc_address {
            Some(get_proc_address) => ExtraFns::load(&**get_proc_address),
            None => {
                warn!("No GL loader available, shader subroutines are disabled");
                ExtraFns::default()
            }
        };

        let config = Config::from_env();
        info!(
            "Shaders from {}, media from {}",
            config.shader_dir.display(),
            config.media_dir.display()
        );

        let scenes: Vec<_> = demos::all_scenes()
            .into_iter()
            .map(|scene| Arc::new(Mutex::new(scene)))
            .collect();

        let mut app = Self {
            errors: vec![None; scenes.len()],
            scenes,
            selected_scene: None,
            config,
            extra,
            wireframe: false,
            paused: false,
            speed: 1.0,
            screenshot_requested: false,
        };

        if let Some(name) = app.config.initial_demo.clone() {
            match app.find_scene(&name) {
                Some(index) => app.select(gl, index),
                None => warn!("No demo named {name:?}"),
            }
        }

        Ok(app)
    }

    fn find_scene(&self, name: &str) -> Option<usize> {
        self.scenes
            .iter()
            .position(|scene| scene.lock().name().eq_ignore_ascii_case(name))
    }

    /// Tears down the current scene and brings up `index`. A scene that fails to initialise is cleaned
    /// up again and keeps its error message; nothing stays selected in that case.
    fn select(&mut self, gl: &glow::Context, index: usize) {
        // No Need to change if it is the same
        if Some(index) == self.selected_scene {
            return;
        }

        // Remove the old gl
        if let Some(old_scene) = self.selected_scene.take() {
            self.scenes[old_scene].lock().destroy_gl(gl);
        }

        // Add the new gl
        let mut scene = self.scenes[index].lock();
        match scene.init_gl(gl, &self.config, &self.extra) {
            Ok(()) => {
                glutils::check_gl_error(gl, file!(), line!());
                info!("Started {}", scene.name());
                self.errors[index] = None;
                self.selected_scene = Some(index);
            }
            Err(e) => {
                error!("{}: {e}", scene.name());
                scene.destroy_gl(gl);
                self.errors[index] = Some(e.to_string());
            }
        }
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let mut clicked = None;

        egui::SidePanel::new(Side::Left, Id::new("Control Panel")).show(ctx, |ui| {
            ui.heading("Demos");
            self.scenes.iter().enumerate().for_each(|(i, scene)| {
                let scene = scene.lock();
                if ui
                    .add(egui::SelectableLabel::new(
                        self.selected_scene == Some(i),
                        scene.name(),
                    ))
                    .clicked()
                {
                    clicked = Some(i);
                }
                if let Some(err) = &self.errors[i] {
                    ui.colored_label(Color32::LIGHT_RED, err);
                }
                if Some(i) == self.selected_scene {
                    if let Some(status) = scene.status() {
                        ui.label(status);
                    }
                }
            });

            ui.add(egui::Separator::default());

            ui.add(egui::Checkbox::new(&mut self.wireframe, "Wireframe"));
            ui.add(egui::Checkbox::new(&mut self.paused, "Pause"));
            ui.add(
                egui::Slider::new(&mut self.speed, RangeInclusive::new(0.0, 10.0)).text("Speed"),
            );
            if ui
                .add_enabled(
                    self.selected_scene.is_some(),
                    egui::Button::new("Screenshot"),
                )
                .clicked()
            {
                self.screenshot_requested = true;
            }
        });

        if let Some(index) = clicked {
            match frame.gl() {
                Some(gl) => self.select(gl, index),
                None => error!("No GL context to start the demo on"),
            }
        }

        self.handle_input(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::canvas(ui.style()).show(ui, |ui| {
                self.custom_painting(ui);
            });
        });
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.scenes
                .iter()
                .for_each(|scene| scene.lock().destroy_gl(gl));
        }
    }
}

impl GalleryApp {
    fn handle_input(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let Some(selected_scene) = self.selected_scene else {
            return;
        };
        let scene = &mut self.scenes[selected_scene].lock();

        // Widgets with focus (the speed slider) keep their keys
        if !ctx.wants_keyboard_input() {
            ctx.input(|i| {
                for event in &i.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } = event
                    {
                        scene.on_key(*key);
                    }
                }
            });
        }

        if !self.paused {
            let dt = ctx.input(|i| i.predicted_dt) * self.speed;
            scene.update(dt);
        }
    }

    fn custom_painting(&mut self, ui: &mut egui::Ui) {
        let Some(selected_scene) = self.selected_scene else {
            ui.centered_and_justified(|ui| ui.label("Pick a demo on the left"));
            return;
        };
        let size = ui.available_size();

        let (rect, _response) = ui.allocate_at_least(size, egui::Sense::hover());

        // Clone to Give to callback
        let scene = self.scenes[selected_scene].clone();
        let wire_frame = self.wireframe;
        let screenshot = std::mem::take(&mut self.screenshot_requested);

        // Create Callback
        let callback = egui::PaintCallback {
            rect,
            callback: std::sync::Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let scene = &mut scene.lock();
                let gl = painter.gl();
                let viewport = info.viewport_in_pixels();
                scene.resize(viewport.width_px.max(0) as u32, viewport.height_px.max(0) as u32);

                let [r, g, b, a] = scene.clear_color();
                unsafe {
                    use glow::HasContext as _;
                    gl.enable(glow::DEPTH_TEST);
                    gl.disable(glow::BLEND);
                    if wire_frame {
                        gl.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
                    } else {
                        gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
                    }
                    gl.clear_color(r, g, b, a);
                    gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                }

                scene.render(gl);

                if screenshot {
                    let path = PathBuf::from(format!(
                        "screenshot-{}.tga",
                        scene.name().to_lowercase().replace(' ', "-")
                    ));
                    let result = glutils::grab_screen_tga(
                        gl,
                        viewport.left_px,
                        viewport.from_bottom_px,
                        viewport.width_px.clamp(0, u16::MAX as i32) as u16,
                        viewport.height_px.clamp(0, u16::MAX as i32) as u16,
                        &path,
                    );
                    match result {
                        Ok(()) => info!("Saved {}", path.display()),
                        Err(e) => error!("Could not save {}: {e}", path.display()),
                    }
                }

                // Reset back to the normal setting
                unsafe {
                    use glow::HasContext as _;
                    gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
                    gl.disable(glow::DEPTH_TEST);
                    gl.use_program(None);
                }
            })),
        };
        ui.painter().add(callback);
    }
}
