// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The logical extent of a raster and its addressing.
use std::fmt;

/// The extent of a dense, row-major `height x width x channels` byte matrix.
///
/// A shape is either empty, with all three dimensions zero, or has all three dimensions
/// positive. Constructors maintain this; there is no way to describe a raster of zero rows but
/// several columns.
///
/// Coordinates follow the image convention `(x, y, z) = (row, column, channel)`. The sample at a
/// coordinate lives at byte `z + y*channels + x*channels*width`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    height: usize,
    width: usize,
    channels: usize,
}

impl Shape {
    /// The shape of the empty raster.
    pub const EMPTY: Self = Shape {
        height: 0,
        width: 0,
        channels: 0,
    };

    /// Describe a non-empty shape.
    ///
    /// # Panics
    ///
    /// When any dimension is zero or the byte length does not fit in a `usize`.
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        assert!(
            height > 0 && width > 0 && channels > 0,
            "raster dimensions must be positive, got HWC[{height}, {width}, {channels}]"
        );

        Self::checked(height, width, channels).expect("raster byte length overflows usize")
    }

    /// Describe a non-empty shape, or `None` if it is degenerate or can not be addressed.
    pub fn checked(height: usize, width: usize, channels: usize) -> Option<Self> {
        if height == 0 || width == 0 || channels == 0 {
            return None;
        }

        let _ = height.checked_mul(width)?.checked_mul(channels)?;

        Some(Shape {
            height,
            width,
            channels,
        })
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// The number of bytes covered by this shape.
    pub const fn len(&self) -> usize {
        // Does not overflow due to construction.
        self.height * self.width * self.channels
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes between the starts of two consecutive rows.
    pub const fn row_stride(&self) -> usize {
        self.width * self.channels
    }

    /// Check whether a signed coordinate addresses a sample of this shape.
    pub fn contains(&self, x: isize, y: isize, z: isize) -> bool {
        match (
            usize::try_from(x),
            usize::try_from(y),
            usize::try_from(z),
        ) {
            (Ok(x), Ok(y), Ok(z)) => x < self.height && y < self.width && z < self.channels,
            _ => false,
        }
    }

    /// The linear byte index of a sample, or `None` when the coordinate is outside the shape.
    pub fn checked_offset(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.height && y < self.width && z < self.channels {
            Some(z + y * self.channels + x * self.row_stride())
        } else {
            None
        }
    }

    /// The linear byte index of a sample.
    ///
    /// # Panics
    ///
    /// When the coordinate is not within the shape, which includes every coordinate of the empty
    /// shape.
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        match self.checked_offset(x, y, z) {
            Some(offset) => offset,
            None => panic!("sample ({x}, {y}, {z}) is out of bounds for {self}"),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "HWC[{}, {}, {}]",
            self.height, self.width, self.channels
        )
    }
}
