//! # bjpeg
//!
//! A baseline JPEG encoder written entirely in Rust.
//!
//! - **Formats**: 8-bit grayscale and RGB input, written as JFIF with a single
//!   sequential-DCT scan.
//! - **Chroma**: 4:2:0 (default for RGB) or 4:4:4 sampling.
//! - **Tables**: the standard Annex K quantization tables scaled by a 1-100
//!   quality factor, and the standard Huffman tables.
//! - **Performance**: block transforms run in parallel via rayon when the
//!   `parallel` feature is enabled; output is identical either way.
//!
//! ## Quickstart
//!
//! ```rust
//! use bjpeg::jpeg::{self, JpegOptions};
//! use bjpeg::ColorType;
//!
//! # fn main() -> bjpeg::Result<()> {
//! // 2x1 RGB pixels (red, blue)
//! let pixels = vec![255, 0, 0, 0, 0, 255];
//! let options = JpegOptions::builder(2, 1)
//!     .color_type(ColorType::Rgb)
//!     .quality(85)
//!     .build();
//! let jpg_bytes = jpeg::encode(&pixels, &options)?;
//! assert_eq!(&jpg_bytes[..2], &[0xFF, 0xD8]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Grayscale and raw channel counts
//!
//! ```rust
//! use bjpeg::jpeg::{encode, JpegOptions};
//!
//! # fn main() -> bjpeg::Result<()> {
//! let pixels = vec![128u8; 16 * 8];
//! let options = JpegOptions::for_channels(16, 8, 1, 50)?;
//! let jpg_bytes = encode(&pixels, &options)?;
//! assert!(!jpg_bytes.is_empty());
//!
//! // Only 1 and 3 channels are encodable.
//! assert!(JpegOptions::for_channels(16, 8, 4, 50).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ### Buffer reuse and writers
//!
//! ```rust
//! use bjpeg::jpeg::{self, JpegOptions, Subsampling};
//! use bjpeg::ColorType;
//!
//! # fn main() -> bjpeg::Result<()> {
//! let pixels = vec![200u8; 4 * 4 * 3];
//! let options = JpegOptions::builder(4, 4)
//!     .color_type(ColorType::Rgb)
//!     .subsampling(Subsampling::S444)
//!     .build();
//!
//! let mut buf = Vec::new();
//! jpeg::encode_into(&mut buf, &pixels, &options)?;
//!
//! let mut sink = std::io::Cursor::new(Vec::new());
//! jpeg::encode_to(&mut sink, &pixels, &options)?;
//! assert_eq!(sink.into_inner(), buf);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//! - `parallel` (default): Parallel block transforms via rayon.
//! - `cli`: The `bjpeg` command-line encoder.
//!
//! ## Logging
//! The library reports through the [`log`] facade and never installs a
//! logger: encode summaries at `debug`, scan details at `trace`, and a
//! `warn` when an out-of-range quality is clamped.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bits;
pub mod color;
pub mod error;
pub mod jpeg;

pub use color::ColorType;
pub use error::{Error, Result};
