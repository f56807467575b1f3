//! EXIF splicing for JPEG (marker segment) containers.
//!
//! The new `APP1` segment goes right after SOI, or after the JFIF `APP0` segment when one directly
//! follows SOI. Every existing `APP1`/`Exif` segment before the scan is dropped; everything else,
//! including all bytes from SOS onwards, is copied verbatim.

use crate::error::{Error, Result};

/// MIME type of JPEG images.
pub const MIME_TYPE: &str = "image/jpeg";

/// Start-of-image marker every JPEG begins with.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// Prefix that identifies an `APP1` segment as EXIF.
pub const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// Largest payload an `APP1` segment can hold (the length field counts itself).
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - 2;

/// Marker codes (the byte following `0xFF`).
pub mod marker {
    pub const TEM: u8 = 0x01;
    pub const RST0: u8 = 0xD0;
    pub const RST7: u8 = 0xD7;
    pub const SOI: u8 = 0xD8;
    pub const EOI: u8 = 0xD9;
    pub const SOS: u8 = 0xDA;
    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;
}

/// A piece of a JPEG buffer, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A marker segment, `bytes` covering the marker, the length field and the payload.
    /// Standalone markers (RSTn, TEM, SOI, EOI) have no length field.
    Marker { offset: usize, marker: u8, bytes: &'a [u8] },
    /// SOS and everything after it. Scan data is never parsed.
    Scan { offset: usize, bytes: &'a [u8] },
    /// Bytes that do not start with a marker; everything to the end of the buffer.
    Trailing { offset: usize, bytes: &'a [u8] },
}

impl<'a> Segment<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        match *self {
            Segment::Marker { bytes, .. } | Segment::Scan { bytes, .. } | Segment::Trailing { bytes, .. } => bytes,
        }
    }

    /// The payload of an `APP1` segment starting with `Exif\0\0`, prefix included.
    pub fn exif_payload(&self) -> Option<&'a [u8]> {
        match *self {
            Segment::Marker { marker: marker::APP1, bytes, .. } if bytes.get(4..10) == Some(EXIF_PREFIX) => {
                Some(&bytes[4..])
            }
            _ => None,
        }
    }
}

/// Iterator over the segments of a JPEG buffer.
///
/// Stops after a [`Segment::Scan`] or [`Segment::Trailing`] piece, or after the first error.
pub struct Segments<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Segments<'a> {
    fn starting_at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos, done: false }
    }

    fn read(&mut self) -> Result<Segment<'a>> {
        let (buf, offset) = (self.buf, self.pos);
        if buf[offset] != 0xFF {
            self.done = true;
            return Ok(Segment::Trailing { offset, bytes: &buf[offset..] });
        }
        let Some(&code) = buf.get(offset + 1) else {
            return Err(Error::malformed(offset, "truncated marker"));
        };

        match code {
            marker::SOS => {
                self.done = true;
                Ok(Segment::Scan { offset, bytes: &buf[offset..] })
            }
            marker::TEM | marker::RST0..=marker::RST7 | marker::SOI | marker::EOI => {
                self.pos = offset + 2;
                Ok(Segment::Marker { offset, marker: code, bytes: &buf[offset..offset + 2] })
            }
            _ => {
                let len = segment_len(buf, offset)?;
                let end = offset + 2 + len;
                self.pos = end;
                Ok(Segment::Marker { offset, marker: code, bytes: &buf[offset..end] })
            }
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.buf.len() {
            return None;
        }
        let segment = self.read();
        if segment.is_err() {
            self.done = true;
        }
        Some(segment)
    }
}

/// `true` if `buf` starts with SOI.
pub fn is_jpeg(buf: &[u8]) -> bool {
    buf.starts_with(&SOI)
}

/// Walk the segments following SOI.
pub fn segments(image: &[u8]) -> Result<Segments<'_>> {
    if !is_jpeg(image) {
        return Err(Error::InvalidFormat);
    }
    Ok(Segments::starting_at(image, SOI.len()))
}

/// Replace the EXIF `APP1` segment of a JPEG with one carrying `exif`.
///
/// `exif` is written as the segment payload unchanged, so it must already begin with
/// `Exif\0\0`.
pub fn inject_exif(image: &[u8], exif: &[u8]) -> Result<Vec<u8>> {
    if !is_jpeg(image) {
        return Err(Error::InvalidFormat);
    }
    if exif.len() > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadTooLarge { len: exif.len(), max: MAX_PAYLOAD_LEN });
    }

    let boundary = header_boundary(image)?;
    let app1 = [0xFF, marker::APP1];
    let app1_len = ((exif.len() + 2) as u16).to_be_bytes();

    let mut parts: Vec<&[u8]> = vec![&image[..boundary], &app1[..], &app1_len[..], exif];
    for segment in Segments::starting_at(image, boundary) {
        let segment = segment?;
        if segment.exif_payload().is_some() {
            log::debug!("Dropping existing EXIF segment ({} bytes)", segment.bytes().len());
            continue;
        }
        parts.push(segment.bytes());
    }

    log::debug!("Inserted {} byte EXIF segment at 0x{boundary:08x}", exif.len() + 4);
    Ok(parts.concat())
}

/// Payload of the first EXIF `APP1` segment, `Exif\0\0` prefix included.
pub fn find_exif(image: &[u8]) -> Result<Option<&[u8]>> {
    for segment in segments(image)? {
        if let Some(payload) = segment?.exif_payload() {
            return Ok(Some(payload));
        }
    }
    Ok(None)
}

/// Offset the new segment is inserted at: after `APP0` if it directly follows SOI, else after SOI.
fn header_boundary(image: &[u8]) -> Result<usize> {
    let pos = SOI.len();
    if image.get(pos..pos + 2) == Some(&[0xFF, marker::APP0][..]) {
        Ok(pos + 2 + segment_len(image, pos)?)
    } else {
        Ok(pos)
    }
}

/// Declared length of the segment whose marker is at `offset`, checked against the buffer.
fn segment_len(buf: &[u8], offset: usize) -> Result<usize> {
    let Some(&[hi, lo]) = buf.get(offset + 2..offset + 4) else {
        return Err(Error::malformed(offset, "truncated segment length"));
    };
    let len = u16::from_be_bytes([hi, lo]) as usize;
    if len < 2 {
        return Err(Error::malformed(offset, "segment length shorter than its length field"));
    }
    if offset + 2 + len > buf.len() {
        return Err(Error::malformed(offset, "segment length exceeds buffer length"));
    }
    Ok(len)
}
