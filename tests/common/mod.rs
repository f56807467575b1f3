#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A lossless (simple, `VP8L`) WebP produced by the `image` encoder.
pub fn encoded_webp(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 0x80]));
    encode(DynamicImage::ImageRgb8(pixels), ImageFormat::WebP)
}

/// A baseline JFIF produced by the `image` encoder.
pub fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 0x40]));
    encode(DynamicImage::ImageRgb8(pixels), ImageFormat::Jpeg)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// A minimal TIFF-structured EXIF body (big-endian, empty IFD0).
pub const TIFF_BODY: &[u8] = b"MM\0*\0\0\0\x08\0\0\0\0\0\0";

pub fn jpeg_exif() -> Vec<u8> {
    [b"Exif\0\0".as_slice(), TIFF_BODY].concat()
}

pub fn riff_len(buf: &[u8]) -> usize {
    u32::from_le_bytes(buf[4..8].try_into().unwrap()) as usize
}
