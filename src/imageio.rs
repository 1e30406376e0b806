use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array3;

use crate::error::{Error, Result};
use crate::Image;

/// Decode a tile into an (H, W, C) array. Grayscale keeps one channel, RGB
/// three, RGBA four; every other pixel format is decoded through an RGB8
/// conversion, which quantizes 16-bit imagery to 8 bits.
pub fn read_image(path: &Path) -> Result<Image> {
    let decoded = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let array = match decoded {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            from_raw(h as usize, w as usize, 1, gray.into_raw())
        }
        DynamicImage::ImageRgb8(rgb) => {
            let (w, h) = rgb.dimensions();
            from_raw(h as usize, w as usize, 3, rgb.into_raw())
        }
        DynamicImage::ImageRgba8(rgba) => {
            let (w, h) = rgba.dimensions();
            from_raw(h as usize, w as usize, 4, rgba.into_raw())
        }
        other => {
            let rgb = other.to_rgb8();
            let (w, h) = rgb.dimensions();
            from_raw(h as usize, w as usize, 3, rgb.into_raw())
        }
    };
    Ok(array)
}

/// Encode an (H, W, C) array to `path`; the format follows the extension.
/// Near-constant patches are valid output and written like any other.
pub fn write_image(path: &Path, image: &Image) -> Result<()> {
    let (h, w, c) = image.dim();
    // Logical iteration order is row-major (H, W, C), exactly the interleaved
    // layout the encoders expect.
    let raw: Vec<u8> = image.iter().copied().collect();
    let save_error = |source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    };
    match c {
        1 => GrayImage::from_raw(w as u32, h as u32, raw)
            .expect("gray buffer length mismatch")
            .save(path)
            .map_err(save_error),
        3 => RgbImage::from_raw(w as u32, h as u32, raw)
            .expect("rgb buffer length mismatch")
            .save(path)
            .map_err(save_error),
        4 => RgbaImage::from_raw(w as u32, h as u32, raw)
            .expect("rgba buffer length mismatch")
            .save(path)
            .map_err(save_error),
        channels => Err(Error::UnsupportedChannels { channels }),
    }
}

fn from_raw(h: usize, w: usize, c: usize, raw: Vec<u8>) -> Image {
    Array3::from_shape_vec((h, w, c), raw).expect("decoded buffer length mismatch")
}
