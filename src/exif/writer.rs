use crate::config::Config;
use crate::error::Result;
use crate::probe::DimensionProbe;
use crate::{jpeg, webp};

/// Splice `exif` into `image` with the default [`Config`].
///
/// See [`replace_exif_with_config`].
pub async fn replace_exif(image: &[u8], exif: &[u8], probe: &dyn DimensionProbe) -> Result<Vec<u8>> {
    replace_exif_with_config(image, exif, probe, &Config::default()).await
}

/// Splice `exif` into `image`, returning a new buffer of the same container format.
///
/// Strategy:
/// 1. If the buffer carries `RIFF`/`WEBP` magic, insert an `EXIF` chunk (synthesizing a
///    `VP8X` chunk via `probe` when the file has none)
/// 2. Otherwise treat it as a JPEG and replace its `APP1`/`Exif` segment
///
/// `image` is never modified. For JPEG, `exif` must already start with `Exif\0\0`.
///
/// # Errors
///
/// [`Error::InvalidFormat`](crate::Error::InvalidFormat) if the buffer is neither format, or any
/// of the fatal errors raised by the selected injector.
pub async fn replace_exif_with_config(
    image: &[u8],
    exif: &[u8],
    probe: &dyn DimensionProbe,
    config: &Config,
) -> Result<Vec<u8>> {
    if let Some(output) = webp::inject_exif(image, exif, probe, &config.webp).await? {
        log::debug!("Wrote {} byte EXIF payload into WebP ({} bytes)", exif.len(), output.len());
        return Ok(output);
    }

    let output = jpeg::inject_exif(image, exif)?;
    log::debug!("Wrote {} byte EXIF payload into JPEG ({} bytes)", exif.len(), output.len());
    Ok(output)
}
