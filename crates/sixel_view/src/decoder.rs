//! Raster decoding backed by the `image` crate.

use std::io::{BufRead, Seek};

use image::{DynamicImage, ImageReader, ImageResult};

/// Something that turns an encoded image stream into pixels.
pub trait ImageDecode {
    /// Decode the whole stream. The reader is consumed and dropped before
    /// this returns, whatever the outcome.
    fn decode<R: BufRead + Seek>(&self, reader: R) -> ImageResult<DynamicImage>;
}

/// Decoder that identifies the container from its leading bytes, never from
/// a file extension.
///
/// Supported containers: PNG, JPEG, GIF (first frame only) and WebP.
#[derive(Clone, Copy, Debug, Default)]
pub struct SniffingDecoder;

impl ImageDecode for SniffingDecoder {
    fn decode<R: BufRead + Seek>(&self, reader: R) -> ImageResult<DynamicImage> {
        let reader = ImageReader::new(reader).with_guessed_format()?;
        log::debug!("detected image format: {:?}", reader.format());
        reader.decode()
    }
}
