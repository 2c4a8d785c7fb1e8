//! The conversion pipeline: open, decode, resolve dimensions, encode.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, Write};
use std::path::Path;

use crate::config::Config;
use crate::decoder::{ImageDecode, SniffingDecoder};
use crate::encoder::{IcySixelEncoder, SixelEncode};
use crate::{ConvertError, Result};

/// Drives one decoder and one encoder.
#[derive(Clone, Debug, Default)]
pub struct Converter<D = SniffingDecoder, E = IcySixelEncoder> {
    decoder: D,
    encoder: E,
}

impl Converter {
    /// Converter with the default `image` decoder and `icy_sixel` encoder.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: ImageDecode, E: SixelEncode> Converter<D, E> {
    pub fn with_parts(decoder: D, encoder: E) -> Self {
        Self { decoder, encoder }
    }

    /// Convert the image file at `path` and write the SIXEL stream to `sink`.
    ///
    /// Nothing is written to `sink` unless decoding succeeded. The file is
    /// closed before this returns on every path.
    pub fn convert<P: AsRef<Path>, W: Write>(
        &self,
        path: P,
        config: &Config,
        sink: &mut W,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConvertError::NotFound(path.to_path_buf()),
            _ => ConvertError::Open(err),
        })?;
        log::debug!("opened {}", path.display());

        self.convert_reader(BufReader::new(file), config, sink)
    }

    /// Convert the image file at `path` and print the result to standard
    /// output.
    pub fn convert_to_stdout<P: AsRef<Path>>(&self, path: P, config: &Config) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.convert(path, config, &mut out)
    }

    /// Same as [`Converter::convert`] for an already opened source.
    pub fn convert_reader<R: BufRead + Seek, W: Write>(
        &self,
        reader: R,
        config: &Config,
        sink: &mut W,
    ) -> Result<()> {
        let image = self.decoder.decode(reader).map_err(ConvertError::Decode)?;
        let (native_width, native_height) = (image.width(), image.height());
        log::debug!("decoded {}x{} image", native_width, native_height);

        let (width, height) = config.resolve_dimensions(native_width, native_height);
        log::debug!("requesting {}x{} from encoder (0 = auto)", width, height);

        self.encoder
            .encode(&image, width, height, sink)
            .map_err(ConvertError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncodeError;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::io::{Cursor, Read, SeekFrom};
    use std::rc::Rc;

    /// Reader that records when it is dropped.
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        closed: Rc<Cell<bool>>,
    }

    impl TrackedReader {
        fn new(data: Vec<u8>) -> (Self, Rc<Cell<bool>>) {
            let closed = Rc::new(Cell::new(false));
            let reader = Self {
                inner: Cursor::new(data),
                closed: Rc::clone(&closed),
            };
            (reader, closed)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.closed.set(true);
        }
    }

    impl Read for TrackedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl BufRead for TrackedReader {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            self.inner.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.inner.consume(amt)
        }
    }

    impl Seek for TrackedReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    /// Encoder that records the requested dimensions and emits a marker.
    #[derive(Default)]
    struct RecordingEncoder {
        calls: RefCell<Vec<(u32, u32)>>,
    }

    impl SixelEncode for RecordingEncoder {
        fn encode<W: Write>(
            &self,
            _image: &DynamicImage,
            width: u32,
            height: u32,
            sink: &mut W,
        ) -> std::result::Result<(), EncodeError> {
            self.calls.borrow_mut().push((width, height));
            sink.write_all(b"\x1bPq\x1b\\")?;
            Ok(())
        }
    }

    struct FailingEncoder;

    impl SixelEncode for FailingEncoder {
        fn encode<W: Write>(
            &self,
            _image: &DynamicImage,
            _width: u32,
            _height: u32,
            _sink: &mut W,
        ) -> std::result::Result<(), EncodeError> {
            Err(EncodeError::Write(io::Error::other("sink closed")))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 120, 240]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageFormat::Png)
            .expect("Failed to encode test PNG");
        out.into_inner()
    }

    fn config(width: u32, height: u32, scale: f64) -> Config {
        Config {
            width,
            height,
            scale,
        }
    }

    #[test]
    fn test_reader_released_on_success() {
        let (reader, closed) = TrackedReader::new(png(4, 4));
        let mut out = Vec::new();
        Converter::new()
            .convert_reader(reader, &Config::default(), &mut out)
            .unwrap();
        assert!(closed.get());
        assert!(out.starts_with(b"\x1bP"));
    }

    #[test]
    fn test_reader_released_on_decode_failure() {
        let (reader, closed) = TrackedReader::new(b"GIF89a but not really".to_vec());
        let mut out = Vec::new();
        let result = Converter::new().convert_reader(reader, &Config::default(), &mut out);
        assert!(matches!(result, Err(ConvertError::Decode(_))));
        assert!(closed.get());
        assert!(out.is_empty());
    }

    #[test]
    fn test_reader_released_on_encode_failure() {
        let (reader, closed) = TrackedReader::new(png(4, 4));
        let converter = Converter::with_parts(SniffingDecoder, FailingEncoder);
        let mut out = Vec::new();
        let result = converter.convert_reader(reader, &Config::default(), &mut out);
        assert!(matches!(result, Err(ConvertError::Encode(EncodeError::Write(_)))));
        assert!(closed.get());
    }

    #[test]
    fn test_scale_overrides_dimensions_passed_to_encoder() {
        let converter = Converter::with_parts(SniffingDecoder, RecordingEncoder::default());
        let mut out = Vec::new();
        converter
            .convert_reader(Cursor::new(png(10, 10)), &config(50, 50, 2.0), &mut out)
            .unwrap();
        assert_eq!(converter.encoder.calls.borrow().as_slice(), &[(20, 20)]);
    }

    #[test]
    fn test_explicit_dimensions_passed_unmodified() {
        let converter = Converter::with_parts(SniffingDecoder, RecordingEncoder::default());
        let mut out = Vec::new();
        converter
            .convert_reader(Cursor::new(png(10, 10)), &config(50, 50, 1.0), &mut out)
            .unwrap();
        converter
            .convert_reader(Cursor::new(png(10, 10)), &config(0, 0, 1.0), &mut out)
            .unwrap();
        assert_eq!(
            converter.encoder.calls.borrow().as_slice(),
            &[(50, 50), (0, 0)]
        );
    }

    #[test]
    fn test_collapsed_scale_keeps_configured_dimensions() {
        let converter = Converter::with_parts(SniffingDecoder, RecordingEncoder::default());
        let mut out = Vec::new();
        converter
            .convert_reader(Cursor::new(png(10, 10)), &config(7, 0, 0.01), &mut out)
            .unwrap();
        assert_eq!(converter.encoder.calls.borrow().as_slice(), &[(7, 0)]);
    }

    #[test]
    fn test_decode_failure_skips_encoder() {
        let converter = Converter::with_parts(SniffingDecoder, RecordingEncoder::default());
        let mut out = Vec::new();
        let result = converter.convert_reader(
            Cursor::new(b"\x89PNG\r\n\x1a\n".to_vec()),
            &Config::default(),
            &mut out,
        );
        assert!(matches!(result, Err(ConvertError::Decode(_))));
        assert!(converter.encoder.calls.borrow().is_empty());
        assert!(out.is_empty());
    }
}
