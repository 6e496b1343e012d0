// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Resizing, with or without preserving the aspect ratio.
use log::{debug, trace};

use super::{Raster, TransformError};
use crate::resample::{resample, Filter};

impl Raster {
    /// Resample to `height x width` pixels, keeping the channel count.
    ///
    /// Resizing to the current shape leaves the bytes untouched, as does resizing an empty
    /// raster. Uses the default [`Filter`].
    ///
    /// # Panics
    ///
    /// When `height` or `width` is zero.
    pub fn resize(&mut self, height: usize, width: usize) {
        self.resize_with(height, width, Filter::default())
    }

    /// Resample to `height x width` pixels with a specific filter.
    ///
    /// # Panics
    ///
    /// When `height` or `width` is zero.
    pub fn resize_with(&mut self, height: usize, width: usize, filter: Filter) {
        assert!(
            height > 0 && width > 0,
            "resize target must be positive, got {height}x{width}"
        );

        if self.is_empty() {
            debug!("resize of an empty raster ignored");
            return;
        }

        if height == self.height() && width == self.width() {
            return;
        }

        let mut scaled = Raster::with_shape(height, width, self.channels());
        let shape = scaled.shape;
        resample(
            self.as_bytes(),
            self.shape,
            scaled.as_bytes_mut(),
            shape,
            filter,
        );

        trace!("resize: {} -> {}", self.shape, scaled.shape);
        self.swap(&mut scaled);
    }

    /// Resample into `target`, keeping the shape of the target.
    ///
    /// # Errors
    ///
    /// When either raster is empty or the channel counts differ. The target is left untouched.
    pub fn resize_into(&self, target: &mut Raster) -> Result<(), TransformError> {
        if target.is_empty() {
            return Err(TransformError::EmptyTarget);
        }

        if self.is_empty() {
            return Err(TransformError::Empty);
        }

        if target.channels() != self.channels() {
            debug!(
                "resize_into rejected: {} into {}",
                self.shape, target.shape
            );
            return Err(TransformError::ChannelMismatch {
                source: self.channels(),
                target: target.channels(),
            });
        }

        let shape = target.shape;
        resample(
            self.as_bytes(),
            self.shape,
            target.as_bytes_mut(),
            shape,
            Filter::default(),
        );
        Ok(())
    }

    /// Change the number of rows, keeping the width.
    pub fn resize_height(&mut self, height: usize) {
        if self.is_empty() {
            return;
        }

        let width = self.width();
        self.resize(height, width)
    }

    /// Change the number of columns, keeping the height.
    pub fn resize_width(&mut self, width: usize) {
        if self.is_empty() {
            return;
        }

        let height = self.height();
        self.resize(height, width)
    }

    /// Scale uniformly such that the shorter side becomes `size` pixels.
    ///
    /// The longer side is scaled by the same factor, truncating, but never below one pixel.
    ///
    /// ```
    /// use image_raster::Raster;
    ///
    /// let mut image = Raster::with_shape(300, 200, 3);
    /// image.resize_on_smaller_side(100);
    /// assert_eq!((image.height(), image.width()), (150, 100));
    /// ```
    pub fn resize_on_smaller_side(&mut self, size: usize) {
        if self.is_empty() {
            return;
        }

        let (h, w) = (self.height(), self.width());
        let (height, width) = if w < h {
            (scale_side(h, size, w), size)
        } else {
            (size, scale_side(w, size, h))
        };

        self.resize(height, width)
    }

    /// Scale uniformly such that the longer side becomes `size` pixels.
    ///
    /// The shorter side is scaled by the same factor, truncating, but never below one pixel.
    pub fn resize_on_larger_side(&mut self, size: usize) {
        if self.is_empty() {
            return;
        }

        let (h, w) = (self.height(), self.width());
        let (height, width) = if w < h {
            (size, scale_side(w, size, h))
        } else {
            (scale_side(h, size, w), size)
        };

        self.resize(height, width)
    }
}

/// `other * size / pivot` with integer truncation, at least one.
fn scale_side(other: usize, size: usize, pivot: usize) -> usize {
    let scaled = (other as u128 * size as u128) / pivot as u128;
    usize::try_from(scaled).unwrap_or(usize::MAX).max(1)
}
