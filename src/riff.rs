//! RIFF chunk scanning for WebP containers.
//!
//! A WebP file is a 12-byte `RIFF <len> WEBP` header followed by contiguous chunks, each laid out as
//! a four-character tag, a little-endian `u32` payload size, the payload, and one zero pad byte when
//! the size is odd. [`chunks`] walks that layout without copying; [`find_chunk`] returns the first
//! chunk with a given tag.

use std::fmt;

use crate::error::{Error, Result};

/// Length of the `RIFF <len> WEBP` file header.
pub const FILE_HEADER_LEN: usize = 12;

/// Length of a chunk header (tag + size).
pub const CHUNK_HEADER_LEN: usize = 8;

/// A four-byte chunk tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FourCC {
    pub value: [u8; 4],
}

impl FourCC {
    /// Build a tag from a string, padding with spaces to four bytes (`"XMP"` becomes `XMP `).
    pub const fn from_str(name: &str) -> Self {
        let name = name.as_bytes();
        let mut value = [b' '; 4];
        let mut idx = 0;
        while idx < name.len() && idx < 4 {
            value[idx] = name[idx];
            idx += 1;
        }
        Self { value }
    }

    fn read(buf: &[u8], offset: usize) -> Option<Self> {
        let value = buf.get(offset..offset + 4)?.try_into().ok()?;
        Some(Self { value })
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.value) {
            Ok(s) => write!(f, "{}", s.trim_end()),
            Err(_) => write!(f, "0x{:08x}", u32::from_be_bytes(self.value)),
        }
    }
}

macro_rules! chunk_type {
    ($($code:ident),+ $(,)?) => {
        /// Chunk tags the splicer cares about.
        pub mod chunk_type {
            use super::FourCC;
            $(
                #[doc = concat!("The `", stringify!($code), "` chunk tag.")]
                pub const $code: FourCC = FourCC::from_str(stringify!($code));
            )+
        }
    };
}

chunk_type!(ALPH, EXIF, RIFF, VP8X, WEBP, XMP);

/// A chunk located inside a RIFF buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: FourCC,
    /// Offset of the chunk's tag bytes from the start of the buffer.
    pub offset: usize,
    /// Declared payload size.
    pub size: u32,
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    /// Header + payload + pad byte, i.e. the distance to the next chunk's tag.
    pub fn span(&self) -> usize {
        padded_span(self.size)
    }

    /// Offset just past this chunk, including its pad byte.
    pub fn end(&self) -> usize {
        self.offset + self.span()
    }
}

/// Iterator over the chunks following the RIFF file header.
///
/// Yields an error once, then stops, if a header or payload would read past the end of the buffer.
pub struct Chunks<'a> {
    buf: &'a [u8],
    offset: usize,
    end: usize,
    failed: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.end {
            return None;
        }
        let offset = self.offset;
        let chunk = read_chunk(self.buf, offset);
        match &chunk {
            Ok(chunk) => self.offset = chunk.end(),
            Err(_) => self.failed = true,
        }
        Some(chunk)
    }
}

/// Walk the chunks of a RIFF buffer, starting right after the 12-byte file header.
pub fn chunks(buf: &[u8]) -> Chunks<'_> {
    Chunks { buf, offset: FILE_HEADER_LEN, end: buf.len(), failed: false }
}

/// Like [`chunks`], but no chunk is started at or past [`riff_end`].
///
/// Bytes trailing the declared RIFF body are left to the caller.
pub fn body_chunks(buf: &[u8]) -> Chunks<'_> {
    Chunks { buf, offset: FILE_HEADER_LEN, end: riff_end(buf), failed: false }
}

/// Offset just past the RIFF body, as declared by the length field and clamped to the buffer.
pub fn riff_end(buf: &[u8]) -> usize {
    match buf.get(4..8) {
        Some(&[a, b, c, d]) => {
            let declared = 8usize.saturating_add(u32::from_le_bytes([a, b, c, d]) as usize);
            declared.clamp(FILE_HEADER_LEN.min(buf.len()), buf.len())
        }
        _ => buf.len(),
    }
}

/// Return the first chunk tagged `tag`, or `None` if the scan reaches the end without one.
pub fn find_chunk(buf: &[u8], tag: FourCC) -> Result<Option<Chunk<'_>>> {
    for chunk in chunks(buf) {
        let chunk = chunk?;
        if chunk.tag == tag {
            log::debug!("Found `{tag}` chunk at 0x{:08x} ({} bytes)", chunk.offset, chunk.size);
            return Ok(Some(chunk));
        }
    }
    Ok(None)
}

/// `true` if `buf` starts with `RIFF <len> WEBP`.
pub fn is_webp(buf: &[u8]) -> bool {
    buf.len() >= FILE_HEADER_LEN
        && FourCC::read(buf, 0) == Some(chunk_type::RIFF)
        && FourCC::read(buf, 8) == Some(chunk_type::WEBP)
}

/// Encode a complete chunk: tag, little-endian size, payload and the pad byte for odd sizes.
///
/// Fails with [`Error::PayloadTooLarge`] if `payload` does not fit the `u32` size field.
pub fn encode_chunk(tag: FourCC, payload: &[u8]) -> Result<Vec<u8>> {
    let size = u32::try_from(payload.len())
        .map_err(|_| Error::PayloadTooLarge { len: payload.len(), max: u32::MAX as usize })?;
    let mut chunk = Vec::with_capacity(padded_span(size));
    chunk.extend_from_slice(&tag.value);
    chunk.extend_from_slice(&size.to_le_bytes());
    chunk.extend_from_slice(payload);
    if size % 2 == 1 {
        chunk.push(0);
    }
    Ok(chunk)
}

/// Build the `RIFF <len> WEBP` header for a file whose chunks occupy `body_len` bytes.
///
/// The length field counts everything after itself, so it is `body_len + 4`. Returns `None` if
/// that does not fit in a `u32`.
pub fn file_header(body_len: usize) -> Option<[u8; FILE_HEADER_LEN]> {
    let len = body_len.checked_add(4).and_then(|len| u32::try_from(len).ok())?;
    let mut header = [0; FILE_HEADER_LEN];
    header[..4].copy_from_slice(&chunk_type::RIFF.value);
    header[4..8].copy_from_slice(&len.to_le_bytes());
    header[8..].copy_from_slice(&chunk_type::WEBP.value);
    Some(header)
}

fn padded_span(size: u32) -> usize {
    CHUNK_HEADER_LEN + size as usize + (size % 2) as usize
}

fn read_chunk(buf: &[u8], offset: usize) -> Result<Chunk<'_>> {
    let header = buf
        .get(offset..offset + CHUNK_HEADER_LEN)
        .ok_or(Error::malformed(offset, "truncated chunk header"))?;
    let tag = FourCC { value: [header[0], header[1], header[2], header[3]] };
    let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    let start = offset + CHUNK_HEADER_LEN;
    // The pad byte of the final chunk is allowed to be missing; the payload is not.
    let payload = start
        .checked_add(size as usize)
        .and_then(|end| buf.get(start..end))
        .ok_or(Error::malformed(offset, "chunk size exceeds buffer length"))?;

    Ok(Chunk { tag, offset, size, payload })
}
