//! EXIF splicing for WebP (RIFF) containers.
//!
//! Two layouts are handled. An *extended* file has a `VP8X` chunk carrying the canvas size and
//! feature flags; the `EXIF` chunk goes directly after it and the EXIF flag is asserted. A *simple*
//! file has only image data chunks, so a `VP8X` chunk is synthesized from the canvas size reported
//! by a [`DimensionProbe`] and inserted, followed by the `EXIF` chunk, right after the file header.
//!
//! In both cases the RIFF length field is recomputed from the output length.

use std::ops::Range;

use crate::config::WebpConfig;
use crate::error::{Error, Result};
use crate::probe::{DimensionProbe, Dimensions};
use crate::riff::chunk_type::{ALPH, EXIF, VP8X, XMP};
use crate::riff::{self, Chunk, CHUNK_HEADER_LEN, FILE_HEADER_LEN};

/// MIME type handed to the dimension probe.
pub const MIME_TYPE: &str = "image/webp";

/// Payload length of a `VP8X` chunk.
pub const VP8X_PAYLOAD_LEN: usize = 10;

bitflags::bitflags! {
    /// Feature flags stored in the first byte of a `VP8X` payload.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Vp8xFlags: u8 {
        const ICCP = 0b0010_0000;
        const ALPHA = 0b0001_0000;
        const EXIF = 0b0000_1000;
        const XMP = 0b0000_0100;
        const ANIMATION = 0b0000_0010;
    }
}

/// Splice `exif` into a WebP buffer.
///
/// Returns `Ok(None)` when `image` does not carry `RIFF`/`WEBP` magic, so the caller can try
/// another container. The probe is only consulted for simple files without a `VP8X` chunk.
pub async fn inject_exif(
    image: &[u8],
    exif: &[u8],
    probe: &dyn DimensionProbe,
    config: &WebpConfig,
) -> Result<Option<Vec<u8>>> {
    if !riff::is_webp(image) {
        log::debug!("No RIFF/WEBP magic, WebP injector not applicable");
        return Ok(None);
    }

    let output = match riff::find_chunk(image, VP8X)? {
        Some(vp8x) => inject_extended(image, vp8x, exif, config)?,
        None => {
            let flags = detect_flags(image)?;
            log::debug!("No `VP8X` chunk, asking {} probe for the canvas size", probe.name());
            let dimensions = probe
                .dimensions(image, MIME_TYPE)
                .await
                .map_err(Error::DimensionProbeFailure)?;
            inject_simple(image, flags, dimensions, exif, config)?
        }
    };
    Ok(Some(output))
}

/// Insert the `EXIF` chunk directly after an existing `VP8X` chunk and assert its EXIF flag.
///
/// `vp8x` must have been located in `image` by [`riff::find_chunk`]; a chunk that does not
/// describe a `VP8X` chunk of `image` is rejected as malformed.
pub fn inject_extended(image: &[u8], vp8x: Chunk<'_>, exif: &[u8], config: &WebpConfig) -> Result<Vec<u8>> {
    if !riff::is_webp(image) {
        return Err(Error::InvalidFormat);
    }
    if vp8x.tag != VP8X
        || vp8x.payload.len() != vp8x.size as usize
        || image.get(vp8x.offset..vp8x.offset.saturating_add(4)) != Some(&VP8X.value[..])
    {
        return Err(Error::malformed(vp8x.offset, "chunk is not a `VP8X` chunk of this image"));
    }
    let Some(&flags_byte) = vp8x.payload.first() else {
        return Err(Error::malformed(vp8x.offset, "empty `VP8X` chunk"));
    };
    let flags_at = vp8x.offset + CHUNK_HEADER_LEN;
    let insert_at = vp8x.end();
    if insert_at > image.len() {
        return Err(Error::malformed(vp8x.offset, "`VP8X` chunk is missing its pad byte"));
    }

    let original = Vp8xFlags::from_bits_retain(flags_byte);
    if !original.contains(Vp8xFlags::EXIF) {
        log::debug!("Setting EXIF flag on `VP8X` (was {:08b})", original.bits());
    }
    let flags = [(original | Vp8xFlags::EXIF).bits()];
    let exif_chunk = riff::encode_chunk(EXIF, exif)?;

    let mut body: Vec<&[u8]> = Vec::new();
    let (mut flagged, mut inserted) = (false, false);
    for range in retained_ranges(image, config.replace_existing_exif)? {
        let mut pos = range.start;
        if range.contains(&flags_at) {
            body.push(&image[pos..flags_at]);
            body.push(&flags);
            pos = flags_at + 1;
            flagged = true;
        }
        if !inserted && (range.start..=range.end).contains(&insert_at) {
            body.push(&image[pos..insert_at]);
            body.push(&exif_chunk);
            pos = insert_at;
            inserted = true;
        }
        body.push(&image[pos..range.end]);
    }
    if !(flagged && inserted) {
        return Err(Error::malformed(vp8x.offset, "`VP8X` chunk is not on a chunk boundary"));
    }

    log::debug!("Inserted {} byte `EXIF` chunk at 0x{insert_at:08x}", exif_chunk.len());
    assemble(body)
}

/// Prepend a synthesized `VP8X` chunk and the `EXIF` chunk to the chunks of a simple WebP.
///
/// `flags` describes the optional chunks already present (see [`detect_flags`]); the EXIF
/// flag is always added.
pub fn inject_simple(
    image: &[u8],
    flags: Vp8xFlags,
    dimensions: Dimensions,
    exif: &[u8],
    config: &WebpConfig,
) -> Result<Vec<u8>> {
    if !riff::is_webp(image) {
        return Err(Error::InvalidFormat);
    }
    dimensions.validate_canvas().map_err(Error::DimensionProbeFailure)?;
    let vp8x_chunk = encode_vp8x_chunk(flags | Vp8xFlags::EXIF, dimensions);
    let exif_chunk = riff::encode_chunk(EXIF, exif)?;

    let mut body: Vec<&[u8]> = vec![&vp8x_chunk[..], &exif_chunk[..]];
    for range in retained_ranges(image, config.replace_existing_exif)? {
        body.push(&image[range]);
    }

    log::debug!(
        "Synthesized `VP8X` for {}x{} canvas, flags {:08b}",
        dimensions.width,
        dimensions.height,
        (flags | Vp8xFlags::EXIF).bits()
    );
    assemble(body)
}

/// Flags a synthesized `VP8X` needs for the optional chunks of a simple WebP.
///
/// Only the declared RIFF body is walked.
pub fn detect_flags(image: &[u8]) -> Result<Vp8xFlags> {
    let mut flags = Vp8xFlags::empty();
    for chunk in riff::body_chunks(image) {
        match chunk?.tag {
            XMP => flags |= Vp8xFlags::XMP,
            ALPH => flags |= Vp8xFlags::ALPHA,
            _ => {}
        }
    }
    Ok(flags)
}

/// Payload of the first `EXIF` chunk, if any. `image` must be a RIFF/WEBP buffer.
pub fn find_exif(image: &[u8]) -> Result<Option<&[u8]>> {
    Ok(riff::find_chunk(image, EXIF)?.map(|chunk| chunk.payload))
}

/// Encode a 10-byte `VP8X` payload wrapped in its chunk header.
///
/// The canvas sides are stored minus one as 24-bit little-endian integers, so `dimensions`
/// must pass [`Dimensions::validate_canvas`].
pub fn encode_vp8x_chunk(flags: Vp8xFlags, dimensions: Dimensions) -> Vec<u8> {
    let width = dimensions.width.saturating_sub(1).to_le_bytes();
    let height = dimensions.height.saturating_sub(1).to_le_bytes();
    let payload: [u8; VP8X_PAYLOAD_LEN] = [
        flags.bits(),
        0,
        0,
        0,
        width[0],
        width[1],
        width[2],
        height[0],
        height[1],
        height[2],
    ];
    let mut chunk = Vec::with_capacity(CHUNK_HEADER_LEN + VP8X_PAYLOAD_LEN);
    chunk.extend_from_slice(&VP8X.value);
    chunk.extend_from_slice(&(VP8X_PAYLOAD_LEN as u32).to_le_bytes());
    chunk.extend_from_slice(&payload);
    chunk
}

/// Ranges of `image` after the file header that survive into the output.
///
/// When `drop_exif` is set the chunks of the declared RIFF body are walked and every `EXIF`
/// chunk is left out; bytes trailing the last chunk are kept as one range. Otherwise the whole
/// body is kept as one range.
fn retained_ranges(image: &[u8], drop_exif: bool) -> Result<Vec<Range<usize>>> {
    if !drop_exif {
        return Ok(vec![FILE_HEADER_LEN..image.len()]);
    }

    let mut ranges = Vec::new();
    let mut walked = FILE_HEADER_LEN;
    for chunk in riff::body_chunks(image) {
        let chunk = chunk?;
        walked = chunk.end().min(image.len());
        if chunk.tag == EXIF {
            log::debug!("Dropping existing `EXIF` chunk at 0x{:08x} ({} bytes)", chunk.offset, chunk.size);
            continue;
        }
        ranges.push(chunk.offset..walked);
    }
    if walked < image.len() {
        log::debug!("Keeping {} bytes trailing the last chunk", image.len() - walked);
        ranges.push(walked..image.len());
    }
    Ok(ranges)
}

fn assemble(body: Vec<&[u8]>) -> Result<Vec<u8>> {
    let body_len: usize = body.iter().map(|part| part.len()).sum();
    let header = riff::file_header(body_len).ok_or(Error::PayloadTooLarge {
        len: body_len + FILE_HEADER_LEN,
        max: u32::MAX as usize + 8,
    })?;

    let mut parts = Vec::with_capacity(body.len() + 1);
    parts.push(&header[..]);
    parts.extend(body);
    Ok(parts.concat())
}
