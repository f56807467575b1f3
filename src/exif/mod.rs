//! EXIF payload splicing and extraction.
//!
//! This module provides the format-aware entry points:
//!
//! - [`replace_exif`]: Splice a serialized EXIF payload into a WebP or JPEG buffer
//! - [`extract_exif`]: Borrow the EXIF payload back out of either container
//! - [`load_exif`] / [`dump_exif`]: Route the extracted payload through an [`ExifCodec`]
//!
//! The writer tries the WebP injector first and falls back to the JPEG injector when the
//! buffer has no `RIFF`/`WEBP` magic.

mod reader;
mod writer;

pub use reader::{dump_exif, extract_exif, load_exif, ExifCodec};
pub use writer::{replace_exif, replace_exif_with_config};
