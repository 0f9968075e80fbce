use std::{
    error::Error,
    fmt,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use eframe::glow;
use log::debug;

use super::tga::{TgaError, TgaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    /// Flip decoded images so the first uploaded row is the bottom one. TGA pixels are already stored that way.
    pub flip_y: bool,
    pub mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_y: true,
            mipmaps: true,
        }
    }
}

#[derive(Debug)]
pub enum TextureError {
    Io(PathBuf, io::Error),
    Decode(PathBuf, image::ImageError),
    Tga(PathBuf, TgaError),
    Gl(String),
}
impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Could not open texture {}: {e}", path.display()),
            Self::Decode(path, e) => write!(f, "Could not decode texture {}: {e}", path.display()),
            Self::Tga(path, e) => write!(f, "Could not read texture {}: {e}", path.display()),
            Self::Gl(e) => write!(f, "Unable to create texture object: {e}"),
        }
    }
}
impl Error for TextureError {}

/// Decoded pixels ready for `glTexImage2D`.
#[derive(Debug, Clone)]
struct PixelData {
    width: u32,
    height: u32,
    internal_format: u32,
    format: u32,
    bytes: Vec<u8>,
}

impl PixelData {
    fn load(path: &Path, opts: TextureOptions) -> Result<Self, TextureError> {
        let is_tga = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tga"));

        if is_tga {
            return Self::from_tga(path);
        }

        let file = File::open(path).map_err(|e| TextureError::Io(path.into(), e))?;
        let mut reader = image::ImageReader::new(BufReader::new(file));
        match image::ImageFormat::from_path(path) {
            Ok(format) => reader.set_format(format),
            Err(_) => {
                reader = reader
                    .with_guessed_format()
                    .map_err(|e| TextureError::Io(path.into(), e))?
            }
        }
        let mut img = reader
            .decode()
            .map_err(|e| TextureError::Decode(path.into(), e))?;
        if opts.flip_y {
            img = img.flipv();
        }
        let rgba = img.into_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            internal_format: glow::RGBA8,
            format: glow::RGBA,
            bytes: rgba.into_raw(),
        })
    }

    /// TGA rows are already stored bottom-up, so they are never flipped.
    fn from_tga(path: &Path) -> Result<Self, TextureError> {
        let file = File::open(path).map_err(|e| TextureError::Io(path.into(), e))?;
        let tga = TgaImage::read(&mut BufReader::new(file))
            .map_err(|e| TextureError::Tga(path.into(), e))?;
        let (internal_format, format) = tga.gl_formats();
        Ok(Self {
            width: tga.width as u32,
            height: tga.height as u32,
            internal_format,
            format,
            bytes: tga.pixels,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Texture {
    handle: glow::Texture,
    unit: u32,
}

impl Texture {
    /// Loads an image file into a 2D texture bound on `GL_TEXTURE0 + unit`.
    /// `.tga` files go through the in-house TGA reader and keep their BGR(A) or grey layout,
    /// everything else is decoded by `image`.
    pub fn from_file(
        gl: &glow::Context,
        path: &Path,
        unit: u32,
        opts: TextureOptions,
    ) -> Result<Self, TextureError> {
        let pixels = PixelData::load(path, opts)?;
        Self::upload(gl, path, &pixels, unit, opts.mipmaps)
    }

    fn upload(
        gl: &glow::Context,
        path: &Path,
        pixels: &PixelData,
        unit: u32,
        mipmaps: bool,
    ) -> Result<Self, TextureError> {
        debug!(
            "{}: {}x{} texture on unit {unit}",
            path.display(),
            pixels.width,
            pixels.height
        );

        unsafe {
            use glow::HasContext as _;

            let handle = gl.create_texture().map_err(TextureError::Gl)?;
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(handle));

            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                pixels.internal_format as i32,
                pixels.width as i32,
                pixels.height as i32,
                0,
                pixels.format,
                glow::UNSIGNED_BYTE,
                Some(pixels.bytes.as_slice()),
            );
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);

            if mipmaps {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );

            Ok(Self { handle, unit })
        }
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            gl.active_texture(glow::TEXTURE0 + self.unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.handle));
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            gl.delete_texture(self.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gallery-{}-{name}", std::process::id()))
    }

    #[test]
    fn png_is_flipped_and_expanded_to_rgba() {
        let path = scratch("two-rows.png");
        let img = image::RgbImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let pixels = PixelData::load(&path, TextureOptions::default()).unwrap();
        assert_eq!((pixels.width, pixels.height), (1, 2));
        assert_eq!(pixels.format, glow::RGBA);
        // Bottom row first
        assert_eq!(pixels.bytes, [0, 0, 255, 255, 255, 0, 0, 255]);

        let unflipped = PixelData::load(
            &path,
            TextureOptions {
                flip_y: false,
                mipmaps: false,
            },
        )
        .unwrap();
        assert_eq!(unflipped.bytes, [255, 0, 0, 255, 0, 0, 255, 255]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn tga_goes_through_the_tga_reader() {
        let path = scratch("grey.tga");
        TgaImage {
            width: 2,
            height: 1,
            components: 1,
            pixels: vec![7, 9],
        }
        .write(&mut File::create(&path).unwrap())
        .unwrap();

        let pixels = PixelData::load(&path, TextureOptions::default()).unwrap();
        assert_eq!(pixels.format, glow::RED);
        assert_eq!(pixels.bytes, [7, 9]);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = PixelData::load(Path::new("no/such/brick.png"), TextureOptions::default())
            .unwrap_err();
        assert!(matches!(err, TextureError::Io(..)), "{err:?}");
        assert!(err.to_string().contains("no/such/brick.png"));

        let err = PixelData::from_tga(Path::new("no/such/brick.tga")).unwrap_err();
        assert!(matches!(err, TextureError::Io(..)), "{err:?}");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let path = scratch("garbage.png");
        fs::write(&path, b"not a png").unwrap();
        let err = PixelData::load(&path, TextureOptions::default()).unwrap_err();
        assert!(matches!(err, TextureError::Decode(..)), "{err:?}");
        fs::remove_file(&path).unwrap();
    }
}
