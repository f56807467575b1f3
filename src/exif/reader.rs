use crate::error::{Error, Result};
use crate::pipeline::ImageKind;
use crate::{jpeg, webp};

/// Converts between a tag dictionary and its serialized EXIF payload.
///
/// The splicer treats payloads as opaque bytes; implement this trait over whichever EXIF
/// library the application already uses to get [`load_exif`] and [`dump_exif`].
pub trait ExifCodec {
    /// The decoded tag dictionary.
    type Tags;

    /// Serialize `tags` into a payload suitable for [`replace_exif`](super::replace_exif).
    fn encode(&self, tags: &Self::Tags) -> anyhow::Result<Vec<u8>>;

    /// Parse a payload as returned by [`extract_exif`].
    fn decode(&self, payload: &[u8]) -> anyhow::Result<Self::Tags>;
}

/// Borrow the EXIF payload embedded in a WebP or JPEG buffer.
///
/// For WebP this is the payload of the first `EXIF` chunk; for JPEG the payload of the first
/// `APP1` segment starting with `Exif\0\0`, prefix included, so the result can be handed straight
/// back to [`replace_exif`](super::replace_exif). Returns `Ok(None)` if the image has no EXIF.
pub fn extract_exif(image: &[u8]) -> Result<Option<&[u8]>> {
    let payload = match ImageKind::detect(image) {
        Some(ImageKind::WebP) => webp::find_exif(image)?,
        Some(ImageKind::Jpeg) => jpeg::find_exif(image)?,
        None => return Err(Error::InvalidFormat),
    };
    if payload.is_none() {
        log::debug!("No EXIF payload found");
    }
    Ok(payload)
}

/// Extract and decode the EXIF tags of an image.
pub fn load_exif<C: ExifCodec + ?Sized>(image: &[u8], codec: &C) -> Result<Option<C::Tags>> {
    extract_exif(image)?
        .map(|payload| codec.decode(payload).map_err(Error::Codec))
        .transpose()
}

/// Extract the EXIF tags of an image and re-serialize them with `codec`.
///
/// The result is a normalized payload ready to be spliced into another image.
pub fn dump_exif<C: ExifCodec + ?Sized>(image: &[u8], codec: &C) -> Result<Option<Vec<u8>>> {
    let Some(tags) = load_exif(image, codec)? else {
        return Ok(None);
    };
    codec.encode(&tags).map(Some).map_err(Error::Codec)
}
