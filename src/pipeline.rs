use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exif::{self, ExifCodec};
use crate::probe::DimensionProbe;
use crate::{jpeg, riff, webp};

/// The container format of an image buffer, determined by its magic bytes.
///
/// File extensions and declared MIME types are never consulted.
///
/// # Example
///
/// ```rust
/// use exif_splice::pipeline::ImageKind;
///
/// let kind = ImageKind::detect(b"RIFF\x04\0\0\0WEBP");
/// assert_eq!(kind, Some(ImageKind::WebP));
///
/// let kind = ImageKind::detect(&[0xFF, 0xD8, 0xFF, 0xD9]);
/// assert_eq!(kind, Some(ImageKind::Jpeg));
///
/// assert_eq!(ImageKind::detect(b"GIF89a"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// WebP: EXIF in a RIFF `EXIF` chunk
    WebP,
    /// JPEG: EXIF in an `APP1` segment
    Jpeg,
}

impl ImageKind {
    /// Probe the magic bytes of `image`. WebP is checked first.
    pub fn detect(image: &[u8]) -> Option<Self> {
        if riff::is_webp(image) {
            Some(Self::WebP)
        } else if jpeg::is_jpeg(image) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Get the MIME type of this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::WebP => webp::MIME_TYPE,
            Self::Jpeg => jpeg::MIME_TYPE,
        }
    }
}

/// A `data:<mime>;base64,<payload>` URL, decoded.
///
/// # Example
///
/// ```rust
/// use exif_splice::pipeline::DataUrl;
///
/// let url: DataUrl = "data:image/jpeg;base64,/9j/2Q==".parse().unwrap();
/// assert_eq!(url.mime_type, "image/jpeg");
/// assert_eq!(url.data, [0xFF, 0xD8, 0xFF, 0xD9]);
/// assert_eq!(url.to_string(), "data:image/jpeg;base64,/9j/2Q==");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self { mime_type: mime_type.into(), data }
    }

    /// Decode a base64 data URL. Non-base64 (percent-encoded) URLs are rejected.
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::DataUrl("missing `data:` scheme".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::DataUrl("missing `,` separator".to_string()))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| Error::DataUrl("only base64 data URLs are supported".to_string()))?;
        let data = STANDARD
            .decode(payload)
            .map_err(|e| Error::DataUrl(format!("invalid base64 payload: {e}")))?;
        Ok(Self::new(mime_type, data))
    }
}

impl FromStr for DataUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Splice `exif` into the image carried by a data URL and return a new data URL.
///
/// The output keeps the input's MIME type.
///
/// # Example
///
/// ```rust,no_run
/// use exif_splice::config::Config;
/// use exif_splice::pipeline::replace_exif_in_data_url;
/// use exif_splice::probe::ImageDecoderProbe;
///
/// # async fn example(url: &str, exif: &[u8]) -> exif_splice::Result<()> {
/// let updated = replace_exif_in_data_url(url, exif, &ImageDecoderProbe::new(), &Config::default()).await?;
/// println!("{updated}");
/// # Ok(())
/// # }
/// ```
pub async fn replace_exif_in_data_url(
    url: &str,
    exif: &[u8],
    probe: &dyn DimensionProbe,
    config: &Config,
) -> Result<String> {
    let DataUrl { mime_type, data } = DataUrl::parse(url)?;
    let output = exif::replace_exif_with_config(&data, exif, probe, config).await?;
    Ok(DataUrl::new(mime_type, output).to_string())
}

/// Decode the EXIF tags of the image carried by a data URL.
pub fn load_exif_from_data_url<C: ExifCodec + ?Sized>(url: &str, codec: &C) -> Result<Option<C::Tags>> {
    let DataUrl { data, .. } = DataUrl::parse(url)?;
    exif::load_exif(&data, codec)
}

/// Re-serialize the EXIF tags of the image carried by a data URL.
pub fn dump_exif_from_data_url<C: ExifCodec + ?Sized>(url: &str, codec: &C) -> Result<Option<Vec<u8>>> {
    let DataUrl { data, .. } = DataUrl::parse(url)?;
    exif::dump_exif(&data, codec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Dimensions;
    use assert_matches::assert_matches;

    struct RawCodec;

    impl ExifCodec for RawCodec {
        type Tags = Vec<u8>;

        fn encode(&self, tags: &Self::Tags) -> anyhow::Result<Vec<u8>> {
            Ok(tags.clone())
        }

        fn decode(&self, payload: &[u8]) -> anyhow::Result<Self::Tags> {
            Ok(payload.to_vec())
        }
    }

    const TINY_JPEG: &[u8] = b"\xFF\xD8\xFF\xDA\x00\x02\x00\xFF\xD9";

    fn jpeg_url() -> String {
        DataUrl::new("image/jpeg", TINY_JPEG.to_vec()).to_string()
    }

    // ── ImageKind::detect ────────────────────────────────────────────

    #[test]
    fn detect_prefers_magic_over_nothing() {
        assert_eq!(ImageKind::detect(b"RIFF\0\0\0\0WEBPVP8L"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::detect(b"RIFF\0\0\0\0WEB"), None);
        assert_eq!(ImageKind::detect(&[0xFF]), None);
        assert_eq!(ImageKind::WebP.mime_type(), "image/webp");
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
    }

    // ── DataUrl ──────────────────────────────────────────────────────

    #[test]
    fn data_url_rejects_malformed_input() {
        assert_matches!(DataUrl::parse("image/jpeg;base64,AAAA"), Err(Error::DataUrl(_)));
        assert_matches!(DataUrl::parse("data:image/jpeg;base64"), Err(Error::DataUrl(_)));
        assert_matches!(DataUrl::parse("data:image/jpeg,%FF%D8"), Err(Error::DataUrl(_)));
        assert_matches!(DataUrl::parse("data:image/jpeg;base64,***"), Err(Error::DataUrl(_)));
    }

    #[test]
    fn data_url_round_trip() {
        let url = jpeg_url();
        let parsed: DataUrl = url.parse().unwrap();
        assert_eq!(parsed.data, TINY_JPEG);
        assert_eq!(parsed.to_string(), url);
    }

    // ── data URL pipeline ────────────────────────────────────────────

    #[tokio::test]
    async fn replace_in_data_url_keeps_mime_type() {
        let url = replace_exif_in_data_url(&jpeg_url(), b"Exif\0\0abc", &Dimensions::new(1, 1), &Config::default())
            .await
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let loaded = load_exif_from_data_url(&url, &RawCodec).unwrap();
        assert_eq!(loaded.as_deref(), Some(&b"Exif\0\0abc"[..]));
        let dumped = dump_exif_from_data_url(&url, &RawCodec).unwrap();
        assert_eq!(dumped.as_deref(), Some(&b"Exif\0\0abc"[..]));
    }

    #[test]
    fn load_from_data_url_without_exif() {
        assert_eq!(load_exif_from_data_url(&jpeg_url(), &RawCodec).unwrap(), None);
    }
}
