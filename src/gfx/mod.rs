pub mod camera;
pub mod glutils;
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod tga;
pub mod vertex;

pub use mesh::{Mesh, PointBuffer};
pub use shader::Shader;
pub use texture::Texture;
pub use vertex::Vertex;

use std::error::Error;

use eframe::glow;

/// Anything that owns GPU buffers which have to be created and torn down against a live context.
pub trait Model {
    fn setup_gl(&mut self, gl: &glow::Context) -> Result<(), Box<dyn Error>>;
    fn destroy_gl(&mut self, gl: &glow::Context);

    fn draw(&self, gl: &glow::Context);
}
