use std::{
    error::Error,
    ffi::{c_void, CStr, CString},
    fs::File,
    io::BufWriter,
    path::Path,
};

use eframe::glow;
use log::{error, info};

use super::tga::TgaImage;

/// Drains the GL error queue, logging every entry. Returns how many errors were pending.
pub fn check_gl_error(gl: &glow::Context, file: &str, line: u32) -> u32 {
    use glow::HasContext as _;

    // A lost context can report the same error forever
    const MAX_ERRORS: u32 = 32;

    let mut count = 0;
    while count < MAX_ERRORS {
        let err = unsafe { gl.get_error() };
        if err == glow::NO_ERROR {
            break;
        }
        error!("glError in file {file} @ line {line}: {}", error_name(err));
        count += 1;
    }
    count
}

pub fn error_name(err: u32) -> &'static str {
    match err {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        glow::NO_ERROR => "GL_NO_ERROR",
        _ => "unknown GL error",
    }
}

pub fn dump_gl_info(gl: &glow::Context, dump_extensions: bool) {
    use glow::HasContext as _;

    unsafe {
        info!("GL Vendor    : {}", gl.get_parameter_string(glow::VENDOR));
        info!("GL Renderer  : {}", gl.get_parameter_string(glow::RENDERER));
        info!("GL Version   : {}", gl.get_parameter_string(glow::VERSION));
        info!(
            "GL Version   : {}.{}",
            gl.get_parameter_i32(glow::MAJOR_VERSION),
            gl.get_parameter_i32(glow::MINOR_VERSION)
        );
        info!(
            "GLSL Version : {}",
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION)
        );
    }

    if dump_extensions {
        let mut extensions: Vec<_> = gl.supported_extensions().iter().collect();
        extensions.sort();
        extensions.iter().for_each(|ext| info!("{ext}"));
    }
}

/// Reads back the RGB contents of a framebuffer region and stores it as a TGA file.
pub fn grab_screen_tga(
    gl: &glow::Context,
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    use glow::HasContext as _;

    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    unsafe {
        gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
        gl.read_pixels(
            x,
            y,
            width as i32,
            height as i32,
            glow::RGB,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(&mut pixels),
        );
        gl.pixel_store_i32(glow::PACK_ALIGNMENT, 4);
    }

    let image = TgaImage::from_rgb_rows(width, height, &pixels)?;
    let mut file = BufWriter::new(File::create(path)?);
    image.write(&mut file)?;
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      Entry Points glow does not wrap                                              //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Shader subroutine entry points, loaded through the `gl` crate from the same context glow runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraFns {
    subroutines: bool,
}

impl ExtraFns {
    pub fn load(get_proc_address: &dyn Fn(&CStr) -> *const c_void) -> Self {
        gl::load_with(|name| match CString::new(name) {
            Ok(name) => get_proc_address(&name),
            Err(_) => std::ptr::null(),
        });

        let subroutines =
            gl::GetSubroutineIndex::is_loaded() && gl::UniformSubroutinesuiv::is_loaded();
        info!("Shader subroutines available: {subroutines}");

        Self { subroutines }
    }

    pub fn get_subroutine_index(
        &self,
        program: glow::Program,
        shader_type: u32,
        name: &str,
    ) -> Option<u32> {
        if !self.subroutines {
            return None;
        }
        let name = CString::new(name).ok()?;
        Some(unsafe { gl::GetSubroutineIndex(program.0.get(), shader_type, name.as_ptr()) })
    }

    pub fn uniform_subroutines(&self, shader_type: u32, indices: &[u32]) -> bool {
        if !self.subroutines {
            return false;
        }
        unsafe {
            gl::UniformSubroutinesuiv(shader_type, indices.len() as _, indices.as_ptr());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names() {
        assert_eq!(error_name(glow::INVALID_OPERATION), "GL_INVALID_OPERATION");
        assert_eq!(error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(error_name(0xDEAD), "unknown GL error");
    }

    #[test]
    fn missing_entry_points_report_unavailable() {
        let extra = ExtraFns::default();
        assert!(!extra.uniform_subroutines(glow::VERTEX_SHADER, &[0]));
    }
}
