//! Output size configuration.

/// Requested output geometry for one conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Output width in pixels, `0` for auto.
    pub width: u32,

    /// Output height in pixels, `0` for auto.
    pub height: u32,

    /// Factor applied to the native image size. Any value other than `1.0`
    /// overrides `width` and `height` when the scaled size is non-empty.
    pub scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
        }
    }
}

impl Config {
    /// Resolve the dimensions handed to the encoder for an image of the given
    /// native size.
    ///
    /// The scaled size wins over explicit `width`/`height`. A scale that
    /// collapses either axis to zero (or is NaN/negative) is ignored and the
    /// configured values are returned unchanged.
    #[must_use]
    pub fn resolve_dimensions(&self, native_width: u32, native_height: u32) -> (u32, u32) {
        if self.scale != 1.0 {
            let width = scale_dimension(native_width, self.scale);
            let height = scale_dimension(native_height, self.scale);
            if width > 0 && height > 0 {
                return (width, height);
            }
            log::debug!(
                "ignoring scale {} for {}x{} image (scaled size {}x{})",
                self.scale,
                native_width,
                native_height,
                width,
                height
            );
        }
        (self.width, self.height)
    }
}

/// `floor(native * scale)`; the float to int cast saturates and maps NaN to 0.
#[inline]
fn scale_dimension(native: u32, scale: f64) -> u32 {
    (f64::from(native) * scale).floor() as u32
}
