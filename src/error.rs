//! Error types for bjpeg.

use std::fmt;
use std::io;

/// Result type for bjpeg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for encoding operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Channel count other than 1 (grayscale) or 3 (RGB).
    InvalidChannelCount(u8),
    /// Zero width or height.
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },
    /// Dimensions exceed what a SOF0 header can describe.
    ImageTooLarge {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Largest supported dimension
        max: u32,
    },
    /// Pixel buffer length does not match `width * height * channels`.
    InvalidDataLength {
        /// Expected buffer size in bytes
        expected: usize,
        /// Actual buffer size in bytes
        actual: usize,
    },
    /// A DC difference or AC coefficient needs more magnitude bits than
    /// baseline Huffman tables can code.
    CoefficientOverflow {
        /// Category the value would need
        category: u8,
        /// Largest category allowed for this coefficient kind
        max: u8,
    },
    /// A block produced more run-length symbols than the per-block buffer holds.
    SymbolOverflow,
    /// Malformed code-length/value specification.
    InvalidHuffmanTable(&'static str),
    /// Failure writing to the output sink.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidChannelCount(n) => {
                write!(f, "Invalid channel count {n}: expected 1 (gray) or 3 (RGB)")
            }
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {width}x{height}")
            }
            Error::ImageTooLarge { width, height, max } => {
                write!(f, "Image {width}x{height} exceeds maximum dimension {max}")
            }
            Error::InvalidDataLength { expected, actual } => {
                write!(f, "Expected {expected} bytes of pixel data, got {actual}")
            }
            Error::CoefficientOverflow { category, max } => {
                write!(f, "Coefficient category {category} exceeds baseline maximum {max}")
            }
            Error::SymbolOverflow => write!(f, "Too many run-length symbols in one block"),
            Error::InvalidHuffmanTable(reason) => write!(f, "Invalid Huffman table: {reason}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
