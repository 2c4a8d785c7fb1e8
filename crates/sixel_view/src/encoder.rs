//! SIXEL output backed by `icy_sixel`.
//!
//! The encoder resizes the decoded raster to the requested size, quantizes it
//! and writes the finished DCS sequence to the sink in a single write.

use std::io::{self, Write};

use icy_sixel::{sixel_encode, EncodeOptions, SixelError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::{SIXEL_HEIGHT_LIMIT, SIXEL_PIXEL_LIMIT, SIXEL_WIDTH_LIMIT};

/// Errors produced while encoding or writing SIXEL output.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The SIXEL encoder rejected the image
    #[error(transparent)]
    Sixel(#[from] SixelError),

    /// The requested output is too large to allocate
    #[error("output dimensions {width}x{height} exceed the supported limit")]
    DimensionLimit { width: u32, height: u32 },

    /// The output sink failed
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// Something that renders a raster as a SIXEL stream.
pub trait SixelEncode {
    /// Encode `image` at `width`x`height` and write the result to `sink`.
    ///
    /// A dimension of `0` is derived from the native aspect ratio, see
    /// [`target_dimensions`].
    fn encode<W: Write>(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        sink: &mut W,
    ) -> Result<(), EncodeError>;
}

/// Compute the final output size from the native size and the requested one.
///
/// - `(0, 0)` keeps the native size
/// - `(w, 0)` / `(0, h)` derive the missing axis from the native aspect ratio,
///   rounded to the nearest pixel and never below 1
/// - anything else is used as given
///
/// An empty native image yields the request unchanged.
#[must_use]
pub fn target_dimensions(native: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (native_width, native_height) = native;
    if native_width == 0 || native_height == 0 {
        return requested;
    }
    match requested {
        (0, 0) => native,
        (width, 0) => (width, proportional(native_height, width, native_width)),
        (0, height) => (proportional(native_width, height, native_height), height),
        explicit => explicit,
    }
}

/// `round(value * numerator / denominator)`, at least 1.
fn proportional(value: u32, numerator: u32, denominator: u32) -> u32 {
    let denominator = u64::from(denominator);
    let scaled = (u64::from(value) * u64::from(numerator) + denominator / 2) / denominator;
    u32::try_from(scaled.max(1)).unwrap_or(u32::MAX)
}

fn check_limits(width: u32, height: u32) -> Result<(), EncodeError> {
    if width > SIXEL_WIDTH_LIMIT
        || height > SIXEL_HEIGHT_LIMIT
        || u64::from(width) * u64::from(height) > SIXEL_PIXEL_LIMIT
    {
        return Err(EncodeError::DimensionLimit { width, height });
    }
    Ok(())
}

/// Default encoder: bilinear resize followed by `icy_sixel` quantization.
#[derive(Clone, Debug, Default)]
pub struct IcySixelEncoder {
    options: EncodeOptions,
}

impl IcySixelEncoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    /// Build an encoder with a palette size clamped to 2-256.
    pub fn with_palette(max_colors: u16) -> Self {
        Self::new(EncodeOptions {
            max_colors: max_colors.clamp(2, 256),
            ..EncodeOptions::default()
        })
    }

    /// Set the error diffusion strength, clamped to 0.0 (no dithering) - 1.0.
    /// NaN disables dithering.
    #[must_use]
    pub fn with_diffusion(mut self, diffusion: f32) -> Self {
        self.options.diffusion = if diffusion.is_nan() {
            0.0
        } else {
            diffusion.clamp(0.0, 1.0)
        };
        self
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }
}

impl SixelEncode for IcySixelEncoder {
    fn encode<W: Write>(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        sink: &mut W,
    ) -> Result<(), EncodeError> {
        let rgba = prepare(image, width, height)?;
        let (width, height) = rgba.dimensions();

        let sixel = sixel_encode(rgba.as_raw(), width as usize, height as usize, &self.options)?;

        sink.write_all(sixel.as_bytes())?;
        sink.flush()?;
        log::debug!("wrote {} bytes of sixel data", sixel.len());
        Ok(())
    }
}

/// Convert to RGBA and resize to the resolved target size.
fn prepare(image: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage, EncodeError> {
    let (width, height) = target_dimensions((image.width(), image.height()), (width, height));
    check_limits(width, height)?;

    let rgba = image.to_rgba8();
    if rgba.dimensions() == (width, height) || width == 0 || height == 0 {
        return Ok(rgba);
    }
    log::debug!(
        "resizing {}x{} -> {}x{}",
        rgba.width(),
        rgba.height(),
        width,
        height
    );
    Ok(imageops::resize(&rgba, width, height, FilterType::Triangle))
}
