use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{GrayImage, ImageEncoder, Luma, RgbaImage};
use std::path::Path;

use crate::error::{Result, StudioError};

/// Encode bytes as a `data:<mime>;base64,...` URL.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URL into its mime type and decoded payload.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| StudioError::InvalidDataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::InvalidDataUrl("missing ',' separator".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| StudioError::InvalidDataUrl("only base64 payloads are supported".into()))?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok((mime.to_string(), bytes))
}

/// A user-selected source image: the encoded file plus its decoded pixels.
#[derive(Debug, Clone)]
pub struct SourceImage {
    mime: String,
    bytes: Vec<u8>,
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        let pixels = image::load_from_memory_with_format(&bytes, format)?.to_rgba8();
        log::debug!(
            "Loaded source image {}x{} ({})",
            pixels.width(),
            pixels.height(),
            format.to_mime_type()
        );
        Ok(Self {
            mime: format.to_mime_type().to_string(),
            bytes,
            pixels,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    pub fn from_data_url(url: &str) -> Result<Self> {
        let (_, bytes) = parse_data_url(url)?;
        Self::from_bytes(bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Encoded file bytes, as sent to the service.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn data_url(&self) -> String {
        to_data_url(&self.mime, &self.bytes)
    }
}

/// Exported inpainting mask: black where the image is kept, cut out
/// (transparent) where the user painted.
#[derive(Debug, Clone)]
pub struct MaskImage {
    raster: RgbaImage,
    png: Vec<u8>,
}

impl MaskImage {
    pub fn from_raster(raster: RgbaImage) -> Result<Self> {
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png).write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(Self { raster, png })
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// PNG-encoded bytes, as sent to the service.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn data_url(&self) -> String {
        to_data_url("image/png", &self.png)
    }

    /// Count of pixels with any cut-out.
    pub fn painted_pixels(&self) -> usize {
        self.raster.pixels().filter(|p| p[3] < u8::MAX).count()
    }

    /// Strict two-level stencil: white where anything was painted, black
    /// elsewhere.
    pub fn stencil(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            if self.raster.get_pixel(x, y)[3] < u8::MAX {
                Luma([u8::MAX])
            } else {
                Luma([0])
            }
        })
    }
}
