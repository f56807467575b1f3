use anyhow::{Context, Result};
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Largest canvas side a VP8X chunk can describe (24-bit `side - 1`).
pub const MAX_CANVAS_SIDE: u32 = 1 << 24;

/// Canvas width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check the size can be stored in a VP8X header.
    pub fn validate_canvas(&self) -> Result<()> {
        let Self { width, height } = *self;
        if !(1..=MAX_CANVAS_SIDE).contains(&width) || !(1..=MAX_CANVAS_SIDE).contains(&height) {
            anyhow::bail!("canvas {width}x{height} is outside 1..={MAX_CANVAS_SIDE}");
        }
        if width.checked_mul(height).is_none() {
            anyhow::bail!("canvas {width}x{height} pixel count overflows");
        }
        Ok(())
    }
}

/// Supplies the canvas size of an image the container itself does not describe.
///
/// Only simple WebP files (no `VP8X` chunk) need this. Implementations may decode
/// the image, consult a cache, or return sizes the caller already knows.
///
/// # Example
///
/// ```rust
/// use exif_splice::probe::{Dimensions, DimensionProbe};
///
/// # async fn example() -> anyhow::Result<()> {
/// // Callers that already know the size can pass it directly.
/// let probe = Dimensions::new(640, 480);
/// let dims = probe.dimensions(b"...", "image/webp").await?;
/// assert_eq!(dims.width, 640);
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait DimensionProbe: Send + Sync {
    /// A short name for log output.
    fn name(&self) -> &str;

    /// Determine the width and height of `image`, whose type is `mime_type` (e.g. `"image/webp"`).
    async fn dimensions(&self, image: &[u8], mime_type: &str) -> Result<Dimensions>;
}

#[async_trait::async_trait]
impl DimensionProbe for Dimensions {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn dimensions(&self, _image: &[u8], _mime_type: &str) -> Result<Dimensions> {
        Ok(*self)
    }
}

/// Reads dimensions with the `image` crate's decoders on tokio's blocking pool.
///
/// Only the headers are decoded; pixel data is never materialised.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoderProbe;

impl ImageDecoderProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl DimensionProbe for ImageDecoderProbe {
    fn name(&self) -> &str {
        "image"
    }

    async fn dimensions(&self, image: &[u8], mime_type: &str) -> Result<Dimensions> {
        let format = ImageFormat::from_mime_type(mime_type)
            .with_context(|| format!("Unsupported MIME type: {mime_type}"))?;
        let bytes = image.to_vec();

        let (width, height) = tokio::task::spawn_blocking(move || {
            ImageReader::with_format(Cursor::new(bytes), format).into_dimensions()
        })
        .await
        .context("Dimension probe task failed")?
        .context("Failed to read image dimensions")?;

        log::debug!("Decoded {mime_type} dimensions: {width}x{height}");
        Ok(Dimensions { width, height })
    }
}
