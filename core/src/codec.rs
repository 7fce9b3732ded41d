//! Image re-encode path used by the clipboard mirror.
//!
//! The displayed image always keeps its original bytes; only the copy written
//! back to the clipboard goes through here.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageFormat, ImageReader};

use crate::error::ClipboardError;

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_rgba_to_png(
    rgba: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ClipboardError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ClipboardError::InvalidBuffer { width, height });
    }

    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf).write_image(
        rgba,
        width,
        height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf.into_inner())
}

/// Decode PNG, JPEG or WEBP bytes to RGBA pixel data, returning (rgba_bytes, width, height).
pub fn decode_to_rgba(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32), ClipboardError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((rgba.into_raw(), width, height))
}

/// Decode arbitrary image bytes and redraw them as a PNG.
pub fn reencode_as_png(bytes: &[u8]) -> Result<Vec<u8>, ClipboardError> {
    let (rgba, width, height) = decode_to_rgba(bytes)?;
    encode_rgba_to_png(&rgba, width, height)
}

/// Get dimensions from image bytes without fully decoding.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), ClipboardError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    Ok(reader.into_dimensions()?)
}

/// Sniff the MIME type of image bytes from their magic number.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type())
}

/// MIME type implied by a file extension, for image formats only.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    ImageFormat::from_extension(ext).map(|format| format.to_mime_type())
}
