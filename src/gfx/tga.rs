use std::{
    error::Error,
    fmt,
    io::{self, Read, Seek, SeekFrom, Write},
};

use binrw::{binrw, BinRead, BinWrite};
use eframe::glow;

const TYPE_TRUE_COLOR: u8 = 2;
const TYPE_GREYSCALE: u8 = 3;
const ORIGIN_TOP_LEFT: u8 = 0x20;

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_start: u16,
    pub color_map_length: u16,
    pub color_map_depth: u8,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub descriptor: u8,
}

#[derive(Debug)]
pub enum TgaError {
    Header(binrw::Error),
    Io(io::Error),
    Unsupported { image_type: u8, bits_per_pixel: u8 },
    Size { expected: usize, found: usize },
}
impl fmt::Display for TgaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(e) => write!(f, "TgaError: bad header: {e}"),
            Self::Io(e) => write!(f, "TgaError: {e}"),
            Self::Unsupported {
                image_type,
                bits_per_pixel,
            } => write!(
                f,
                "TgaError: unsupported image type {image_type} with {bits_per_pixel} bits per pixel"
            ),
            Self::Size { expected, found } => {
                write!(f, "TgaError: expected {expected} bytes of pixels, got {found}")
            }
        }
    }
}
impl Error for TgaError {}

impl From<io::Error> for TgaError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<binrw::Error> for TgaError {
    fn from(e: binrw::Error) -> Self {
        Self::Header(e)
    }
}

/// Uncompressed TGA pixels, rows stored bottom-up the way `glTexImage2D` expects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgaImage {
    pub width: u16,
    pub height: u16,
    pub components: u8,
    pub pixels: Vec<u8>,
}

impl TgaImage {
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, TgaError> {
        let header = TgaHeader::read(reader)?;

        let components = match (header.image_type, header.bits_per_pixel) {
            (TYPE_TRUE_COLOR, 24) => 3,
            (TYPE_TRUE_COLOR, 32) => 4,
            (TYPE_GREYSCALE, 8) => 1,
            (image_type, bits_per_pixel) => {
                return Err(TgaError::Unsupported {
                    image_type,
                    bits_per_pixel,
                })
            }
        };

        // Skip the image id and any colour map
        let color_map_bytes = if header.color_map_type != 0 {
            (header.color_map_length as u64 * (header.color_map_depth as u64).div_ceil(8)) as i64
        } else {
            0
        };
        reader.seek(SeekFrom::Current(header.id_length as i64 + color_map_bytes))?;

        let row = header.width as usize * components as usize;
        let mut pixels = vec![0u8; row * header.height as usize];
        reader.read_exact(&mut pixels)?;

        if header.descriptor & ORIGIN_TOP_LEFT != 0 {
            flip_rows(&mut pixels, row);
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            components,
            pixels,
        })
    }

    /// Builds an image from a `glReadPixels` RGB read-back.
    pub fn from_rgb_rows(width: u16, height: u16, rgb: &[u8]) -> Result<Self, TgaError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(TgaError::Size {
                expected,
                found: rgb.len(),
            });
        }

        let mut pixels = rgb.to_vec();
        pixels.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));

        Ok(Self {
            width,
            height,
            components: 3,
            pixels,
        })
    }

    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), TgaError> {
        let header = TgaHeader {
            image_type: if self.components == 1 {
                TYPE_GREYSCALE
            } else {
                TYPE_TRUE_COLOR
            },
            width: self.width,
            height: self.height,
            bits_per_pixel: self.components * 8,
            descriptor: if self.components == 4 { 8 } else { 0 },
            ..Default::default()
        };
        header.write(writer)?;
        writer.write_all(&self.pixels)?;
        Ok(())
    }

    /// `(internal format, pixel format)` for uploading these pixels as they are.
    pub fn gl_formats(&self) -> (u32, u32) {
        match self.components {
            1 => (glow::R8, glow::RED),
            4 => (glow::RGBA8, glow::BGRA),
            _ => (glow::RGB8, glow::BGR),
        }
    }
}

fn flip_rows(pixels: &mut [u8], row: usize) {
    if row == 0 {
        return;
    }
    let rows = pixels.len() / row;
    for i in 0..rows / 2 {
        let (top, bottom) = pixels.split_at_mut((rows - 1 - i) * row);
        top[i * row..(i + 1) * row].swap_with_slice(&mut bottom[..row]);
    }
}
