// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Bridges rasters to encoded PNG and JPEG streams.
//!
//! Decoding and encoding are performed by the `image` crate. Decoded pixel data is adopted by the
//! raster as shared storage, without another copy. Failures never modify the raster a result
//! would have been written to.
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use image::{ColorType, DynamicImage, ImageError};
use log::debug;

use crate::shape::Shape;
use crate::Raster;

/// The quality used for every JPEG written by this crate.
pub const JPEG_QUALITY: u8 = 100;

/// The channel count to request when the caller has no preference: RGB.
pub const DEFAULT_CHANNELS: usize = 3;

/// An encoded image format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Png,
    Jpeg,
}

/// Errors of the codec bridge.
#[derive(Debug)]
pub enum CodecError {
    /// An empty raster can not be encoded.
    Empty,
    /// The channel count has no corresponding 8-bit color type.
    UnsupportedChannels(usize),
    /// The decoded or encoded extent is zero or too large.
    InvalidDimensions,
    /// The caller-provided buffer is too small.
    Capacity { needed: usize, available: usize },
    /// The format was not compiled into this build.
    FormatDisabled(Format),
    /// The underlying codec failed.
    Image(ImageError),
    /// Reading or writing a file failed.
    Io(io::Error),
}

impl Format {
    /// Guess the format from the extension of a path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "png" => Some(Format::Png),
            "jpg" | "jpeg" => Some(Format::Jpeg),
            _ => None,
        }
    }
}

impl Raster {
    /// Decode an image file, converting it to `channels` channels.
    ///
    /// Channel counts 1 through 4 select gray, gray with alpha, RGB and RGBA.
    pub fn open(path: impl AsRef<Path>, channels: usize) -> Result<Self, CodecError> {
        let path = path.as_ref();
        check_channels(channels)?;

        let decoded = image::open(path).map_err(|err| {
            debug!("failed to decode {}: {err}", path.display());
            CodecError::from(err)
        })?;

        adopt(decoded, channels)
    }

    /// Decode an in-memory encoded image, converting it to `channels` channels.
    pub fn decode(bytes: &[u8], channels: usize) -> Result<Self, CodecError> {
        check_channels(channels)?;

        let decoded = image::load_from_memory(bytes).map_err(|err| {
            debug!("failed to decode {} bytes: {err}", bytes.len());
            CodecError::from(err)
        })?;

        adopt(decoded, channels)
    }

    /// Replace this raster with a decoded image file.
    ///
    /// On error the raster is left unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>, channels: usize) -> Result<(), CodecError> {
        let mut loaded = Raster::open(path, channels)?;
        self.swap(&mut loaded);
        Ok(())
    }

    /// Replace this raster with an image decoded from memory.
    ///
    /// On error the raster is left unchanged.
    pub fn load_from_memory(&mut self, bytes: &[u8], channels: usize) -> Result<(), CodecError> {
        let mut loaded = Raster::decode(bytes, channels)?;
        self.swap(&mut loaded);
        Ok(())
    }

    /// Encode into a new byte vector.
    pub fn encode(&self, format: Format) -> Result<Vec<u8>, CodecError> {
        if self.is_empty() {
            return Err(CodecError::Empty);
        }

        let color = color_type(self.channels())?;
        let (width, height) = match (u32::try_from(self.width()), u32::try_from(self.height())) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(CodecError::InvalidDimensions),
        };

        let mut out = Vec::new();
        write(&mut out, self.as_bytes(), width, height, color, format).map_err(|err| {
            debug!("failed to encode {self} as {format:?}: {err}");
            err
        })?;
        Ok(out)
    }

    /// Encode into a growable buffer, replacing its contents.
    ///
    /// On error the buffer is left unchanged.
    pub fn encode_into(&self, out: &mut Vec<u8>, format: Format) -> Result<(), CodecError> {
        *out = self.encode(format)?;
        Ok(())
    }

    /// Encode into a fixed buffer, returning the number of bytes written.
    ///
    /// The buffer must be able to hold at least as many bytes as the raw raster, this is checked
    /// before encoding. The encoded stream must also fit.
    pub fn encode_to_slice(&self, buf: &mut [u8], format: Format) -> Result<usize, CodecError> {
        if self.is_empty() {
            return Err(CodecError::Empty);
        }

        if buf.len() < self.size() {
            return Err(CodecError::Capacity {
                needed: self.size(),
                available: buf.len(),
            });
        }

        let encoded = self.encode(format)?;
        if encoded.len() > buf.len() {
            return Err(CodecError::Capacity {
                needed: encoded.len(),
                available: buf.len(),
            });
        }

        buf[..encoded.len()].copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Encode and write to a file.
    pub fn save(&self, path: impl AsRef<Path>, format: Format) -> Result<(), CodecError> {
        let path = path.as_ref();
        let encoded = self.encode(format)?;
        fs::write(path, encoded).map_err(|err| {
            debug!("failed to write {}: {err}", path.display());
            CodecError::Io(err)
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        self.save(path, Format::Png)
    }

    /// Save as a JPEG of quality [`JPEG_QUALITY`].
    pub fn save_jpeg(&self, path: impl AsRef<Path>) -> Result<(), CodecError> {
        self.save(path, Format::Jpeg)
    }
}

fn check_channels(channels: usize) -> Result<(), CodecError> {
    color_type(channels).map(drop)
}

fn color_type(channels: usize) -> Result<ColorType, CodecError> {
    match channels {
        1 => Ok(ColorType::L8),
        2 => Ok(ColorType::La8),
        3 => Ok(ColorType::Rgb8),
        4 => Ok(ColorType::Rgba8),
        other => Err(CodecError::UnsupportedChannels(other)),
    }
}

/// Convert the decoder output to the requested channels and take its buffer.
fn adopt(decoded: DynamicImage, channels: usize) -> Result<Raster, CodecError> {
    let (width, height) = (decoded.width() as usize, decoded.height() as usize);
    let shape = Shape::checked(height, width, channels).ok_or(CodecError::InvalidDimensions)?;

    let bytes = match channels {
        1 => decoded.into_luma8().into_raw(),
        2 => decoded.into_luma_alpha8().into_raw(),
        3 => decoded.into_rgb8().into_raw(),
        4 => decoded.into_rgba8().into_raw(),
        other => return Err(CodecError::UnsupportedChannels(other)),
    };

    Ok(Raster::from_shared(shape, Arc::new(bytes)))
}

#[allow(unused_variables)]
fn write(
    out: &mut Vec<u8>,
    bytes: &[u8],
    width: u32,
    height: u32,
    color: ColorType,
    format: Format,
) -> Result<(), CodecError> {
    use image::ImageEncoder;

    match format {
        #[cfg(feature = "png")]
        Format::Png => image::codecs::png::PngEncoder::new(out)
            .write_image(bytes, width, height, color)
            .map_err(CodecError::from),
        #[cfg(feature = "jpeg")]
        Format::Jpeg => image::codecs::jpeg::JpegEncoder::new_with_quality(out, JPEG_QUALITY)
            .write_image(bytes, width, height, color)
            .map_err(CodecError::from),
        #[allow(unreachable_patterns)]
        disabled => Err(CodecError::FormatDisabled(disabled)),
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodecError::Empty => write!(f, "can not encode an empty raster"),
            CodecError::UnsupportedChannels(channels) => {
                write!(f, "{channels} channels have no 8-bit color type")
            }
            CodecError::InvalidDimensions => write!(f, "image dimensions are zero or too large"),
            CodecError::Capacity { needed, available } => write!(
                f,
                "buffer requires {needed} bytes but has a capacity of {available}"
            ),
            CodecError::FormatDisabled(format) => {
                write!(f, "support for {format:?} is not enabled")
            }
            CodecError::Image(err) => write!(f, "codec error: {err}"),
            CodecError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Image(err) => Some(err),
            CodecError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for CodecError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::IoError(err) => CodecError::Io(err),
            other => CodecError::Image(other),
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(height: usize, width: usize, channels: usize) -> Raster {
        let bytes = (0..height * width * channels).map(|i| (i * 13) as u8).collect();
        Raster::from_vec(height, width, channels, bytes)
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path("a/b.PNG"), Some(Format::Png));
        assert_eq!(Format::from_path("b.jpg"), Some(Format::Jpeg));
        assert_eq!(Format::from_path("b.jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_path("b.gif"), None);
        assert_eq!(Format::from_path("noext"), None);
    }

    #[test]
    fn empty_does_not_encode() {
        assert!(matches!(
            Raster::new().encode(Format::Png),
            Err(CodecError::Empty)
        ));
    }

    #[test]
    fn unsupported_channel_counts() {
        let image = Raster::with_shape(2, 2, 5);
        assert!(matches!(
            image.encode(Format::Png),
            Err(CodecError::UnsupportedChannels(5))
        ));
        assert!(matches!(
            Raster::decode(&[], 0),
            Err(CodecError::UnsupportedChannels(0))
        ));
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_roundtrip_is_lossless() {
        for channels in 1..=4 {
            let image = gradient(7, 5, channels);
            let encoded = image.encode(Format::Png).unwrap();
            let decoded = Raster::decode(&encoded, channels).unwrap();

            assert_eq!(decoded, image);
            assert!(!decoded.is_shared());
        }
    }

    #[cfg(feature = "png")]
    #[test]
    fn decode_adopts_decoder_buffer() {
        let encoded = gradient(3, 4, 3).encode(Format::Png).unwrap();
        let mut decoded = Raster::decode(&encoded, 3).unwrap();
        assert!(format!("{decoded:?}").contains("shared: true"));

        let before = decoded.as_bytes().as_ptr();
        decoded.set_pixel(0, 0, 0, 0xff);
        assert_eq!(decoded.as_bytes().as_ptr(), before);
        assert_eq!(decoded.into_vec().as_ptr(), before);
    }

    #[cfg(feature = "png")]
    #[test]
    fn decode_converts_channels() {
        let rgb = Raster::filled(3, 3, 3, 0x80);
        let encoded = rgb.encode(Format::Png).unwrap();

        let rgba = Raster::decode(&encoded, 4).unwrap();
        assert_eq!(rgba.channels(), 4);
        assert_eq!(rgba.pixels::<4>().unwrap()[0], [0x80, 0x80, 0x80, 0xff]);

        let gray = Raster::decode(&encoded, 1).unwrap();
        assert_eq!(gray.channels(), 1);
        assert!(gray.as_bytes().iter().all(|&b| b == 0x80));
    }

    #[test]
    fn failed_load_leaves_raster() {
        let mut image = Raster::filled(2, 2, 3, 4);
        let before = image.clone();

        assert!(image.load_from_memory(b"not an image", 3).is_err());
        assert!(image
            .load("this/path/does/not/exist.png", DEFAULT_CHANNELS)
            .is_err());
        assert_eq!(image, before);
    }

    #[cfg(feature = "png")]
    #[test]
    fn fixed_buffer_capacity() {
        let image = gradient(8, 8, 3);

        let mut small = vec![0; image.size() - 1];
        assert!(matches!(
            image.encode_to_slice(&mut small, Format::Png),
            Err(CodecError::Capacity { .. })
        ));
        assert!(small.iter().all(|&b| b == 0));

        let mut large = vec![0; 4 * image.size() + 1024];
        let written = image.encode_to_slice(&mut large, Format::Png).unwrap();
        assert_eq!(Raster::decode(&large[..written], 3).unwrap(), image);
    }

    #[cfg(feature = "jpeg")]
    #[test]
    fn jpeg_keeps_shape() {
        let image = Raster::filled(16, 24, 3, 0x40);
        let mut out = Vec::new();
        image.encode_into(&mut out, Format::Jpeg).unwrap();

        let decoded = Raster::decode(&out, 3).unwrap();
        assert_eq!(decoded.shape(), image.shape());
    }

    #[test]
    fn error_sources() {
        use std::error::Error;

        let err = CodecError::from(io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.source().is_some());
        assert!(CodecError::Empty.source().is_none());
        assert_eq!(
            CodecError::Capacity {
                needed: 4,
                available: 2
            }
            .to_string(),
            "buffer requires 4 bytes but has a capacity of 2"
        );
    }
}
