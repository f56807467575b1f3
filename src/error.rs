use thiserror::Error;

/// Errors returned while splicing or extracting EXIF payloads.
///
/// Every variant is fatal: an operation either produces a complete new buffer or
/// returns one of these, never a partially rewritten image. A WebP buffer without
/// `RIFF`/`WEBP` magic is not an error at all; [`webp::inject_exif`](crate::webp::inject_exif)
/// reports it as `Ok(None)` so the dispatcher can fall back to JPEG.
#[derive(Error, Debug)]
pub enum Error {
    /// The buffer is neither a RIFF/WEBP container nor a JPEG starting with SOI.
    #[error("Invalid format: not a WebP or JPEG image")]
    InvalidFormat,

    /// A declared chunk or segment length runs past the end of the buffer or is inconsistent.
    #[error("Malformed container at offset {offset}: {reason}")]
    MalformedContainer { offset: usize, reason: &'static str },

    /// The dimension probe could not supply a usable canvas size for a simple WebP.
    #[error("Failed to determine image dimensions: {0}")]
    DimensionProbeFailure(#[source] anyhow::Error),

    /// The payload, or the rewritten container, cannot be described by its length field.
    #[error("Payload too large: {len} bytes exceed the container limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// The external EXIF codec rejected the payload or tag dictionary.
    #[error("EXIF codec error: {0}")]
    Codec(#[source] anyhow::Error),

    /// The input string is not a base64 `data:` URL.
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: &'static str) -> Self {
        Self::MalformedContainer { offset, reason }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
