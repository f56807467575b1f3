//! # exif-splice
//!
//! Splice pre-serialized EXIF payloads into WebP and JPEG images, and read them back out, by
//! rewriting the container bytes only. Pixel data is never decoded or re-encoded, and every chunk
//! or segment unrelated to EXIF is copied byte-for-byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_splice::probe::ImageDecoderProbe;
//! use exif_splice::{extract_exif, replace_exif};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let image = std::fs::read("photo.webp")?;
//!     // Produced by your EXIF library; JPEG payloads start with `Exif\0\0`.
//!     let exif = std::fs::read("metadata.exif")?;
//!
//!     // The probe is only consulted for simple WebP files, which carry no canvas size.
//!     let updated = replace_exif(&image, &exif, &ImageDecoderProbe::new()).await?;
//!     assert_eq!(extract_exif(&updated)?, Some(&exif[..]));
//!
//!     std::fs::write("photo.webp", &updated)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The container injectors can be called directly. The JPEG injector is synchronous; the WebP
//! injector is split into two pure functions selected by whether a `VP8X` chunk is present:
//!
//! ```rust
//! use exif_splice::config::WebpConfig;
//! use exif_splice::probe::Dimensions;
//! use exif_splice::webp::{self, Vp8xFlags};
//! use exif_splice::jpeg;
//!
//! # fn main() -> exif_splice::Result<()> {
//! let jpeg_image = [0xFF, 0xD8, 0xFF, 0xD9];
//! let out = jpeg::inject_exif(&jpeg_image, b"Exif\0\0MM\0*")?;
//! assert_eq!(jpeg::find_exif(&out)?, Some(&b"Exif\0\0MM\0*"[..]));
//!
//! let webp_image = b"RIFF\x14\0\0\0WEBPVP8L\x08\0\0\0\x2f\0\0\0\0\x88\x88\x08";
//! let out = webp::inject_simple(webp_image, Vp8xFlags::empty(), Dimensions::new(1, 1), b"MM\0*", &WebpConfig::default())?;
//! assert_eq!(&out[12..16], b"VP8X");
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | EXIF location |
//! |--------|---------------|
//! | WebP (extended, with `VP8X`) | `EXIF` chunk directly after `VP8X`; EXIF flag set |
//! | WebP (simple) | synthesized `VP8X` + `EXIF` chunk after the RIFF header |
//! | JPEG | `APP1` segment after SOI (or after JFIF `APP0`) |
//!
//! ## Modules
//!
//! - [`exif`]: Format-aware replace/extract entry points and the [`ExifCodec`] seam
//! - [`webp`] / [`jpeg`]: Container injectors
//! - [`riff`]: RIFF chunk scanner
//! - [`probe`]: Canvas dimension lookup for simple WebP files
//! - [`pipeline`]: Format detection and data URL helpers
//! - [`config`]: Options and JSON loading/saving

pub mod config;
pub mod error;
pub mod exif;
pub mod jpeg;
pub mod pipeline;
pub mod probe;
pub mod riff;
pub mod webp;

pub use config::Config;
pub use error::{Error, Result};
pub use exif::{dump_exif, extract_exif, load_exif, replace_exif, replace_exif_with_config, ExifCodec};
pub use pipeline::{DataUrl, ImageKind};
pub use probe::{DimensionProbe, Dimensions, ImageDecoderProbe};
