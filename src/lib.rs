// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Raster
//!
//! An 8-bit `height x width x channels` image value with geometric transforms.
//!
//! The [`Raster`] owns, or shares, one contiguous byte buffer in row-major order with all
//! channels of a pixel adjacent. It provides bounds-checked sample access, saturating arithmetic,
//! resizing, cropping, borders, compositing of one raster onto another, and a bridge to PNG and
//! JPEG through the `image` crate.
//!
//! ## Usage
//!
//! ```
//! use image_raster::{Format, Raster};
//!
//! let mut canvas = Raster::filled(120, 160, 3, 0xff);
//! let mut patch = Raster::filled(40, 40, 3, 0x00);
//! patch.add_box_border(4, 0x80);
//!
//! canvas.stamp(&patch, 10, 10);
//! canvas.center_crop(100, 100)?;
//! canvas.resize_on_larger_side(50);
//! assert_eq!((canvas.height(), canvas.width()), (50, 50));
//!
//! # #[cfg(feature = "png")] {
//! let png = canvas.encode(Format::Png)?;
//! assert_eq!(Raster::decode(&png, 3)?, canvas);
//! # }
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failures
//!
//! Misuse such as reading outside the raster or asking for a zero-sized allocation panics.
//! Operations that can fail on valid input return a `Result`, and leave the raster as it was when
//! they do.
#![deny(unsafe_code)]

pub mod codec;
mod raster;
mod resample;
mod shape;
mod storage;

pub use self::codec::{CodecError, Format, DEFAULT_CHANNELS, JPEG_QUALITY};
pub use self::raster::{Raster, TransformError};
pub use self::resample::Filter;
pub use self::shape::Shape;
