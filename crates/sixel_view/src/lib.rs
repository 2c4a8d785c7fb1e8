//! # sixel_view
//!
//! Turn PNG and JPEG files into SIXEL graphics for terminal display.
//!
//! Decoding is done by the `image` crate and encoding by `icy_sixel`; both sit
//! behind small capability traits ([`ImageDecode`], [`SixelEncode`]) so either
//! side can be replaced.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sixel_view::{Config, Converter};
//!
//! // Native size
//! Converter::new().convert_to_stdout("snake.png", &Config::default())?;
//!
//! // Half size
//! let config = Config { scale: 0.5, ..Config::default() };
//! Converter::new().convert_to_stdout("snake.png", &config)?;
//! ```
//!
//! ## Dimensions
//!
//! A width or height of `0` means "derive from the native aspect ratio". A
//! scale other than `1.0` replaces both configured dimensions with the scaled
//! native size whenever that size is non-empty.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod convert;
pub mod decoder;
pub mod encoder;

pub use config::Config;
pub use convert::Converter;
pub use decoder::{ImageDecode, SniffingDecoder};
pub use encoder::{target_dimensions, EncodeError, IcySixelEncoder, SixelEncode};
pub use icy_sixel::EncodeOptions;

/// Errors that can occur while converting an image file to SIXEL.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input path does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input exists but could not be opened for reading
    #[error("failed to open file: {0}")]
    Open(io::Error),

    /// The content is not a recognized or well-formed image
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The SIXEL encoder or the output sink failed
    #[error("failed to encode sixel: {0}")]
    Encode(EncodeError),
}

/// Result type for conversions.
pub type Result<T> = core::result::Result<T, ConvertError>;

// Upper bounds applied to encoder targets, see `encoder::check_limits`
pub(crate) const SIXEL_WIDTH_LIMIT: u32 = 1_000_000;
pub(crate) const SIXEL_HEIGHT_LIMIT: u32 = 1_000_000;
pub(crate) const SIXEL_PIXEL_LIMIT: u64 = 1 << 28;
