// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Channel extraction, compositing and cropping.
use std::fmt;

use log::{debug, trace};

use super::Raster;

/// Reasons for a transform to refuse its input.
///
/// A transform that returns one of these has not modified the raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// The raster to be transformed has no samples.
    Empty,
    /// The target of a resize has no samples.
    EmptyTarget,
    /// The crop center is not a pixel of the raster.
    CenterOutOfBounds,
    /// The crop window does not intersect the raster.
    EmptyWindow,
    /// Source and target disagree on the channel count.
    ChannelMismatch { source: usize, target: usize },
    /// A crop ratio is not a positive number.
    InvalidRatio,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransformError::Empty => write!(f, "raster is empty"),
            TransformError::EmptyTarget => write!(f, "target raster is empty"),
            TransformError::CenterOutOfBounds => write!(f, "crop center lies outside the raster"),
            TransformError::EmptyWindow => write!(f, "crop window does not cover any pixel"),
            TransformError::ChannelMismatch { source, target } => write!(
                f,
                "source has {source} channels but target has {target}"
            ),
            TransformError::InvalidRatio => write!(f, "crop ratio must be positive"),
        }
    }
}

impl std::error::Error for TransformError {}

impl Raster {
    /// Extract one channel as a single-channel raster of the same height and width.
    ///
    /// Returns an empty raster when `z` is not a channel of this raster.
    pub fn layer(&self, z: usize) -> Raster {
        if z >= self.channels() {
            return Raster::new();
        }

        let bytes: Vec<u8> = self
            .as_bytes()
            .iter()
            .skip(z)
            .step_by(self.channels())
            .copied()
            .collect();

        Raster::from_vec(self.height(), self.width(), 1, bytes)
    }

    /// Extract all channels, in order, as single-channel rasters.
    pub fn layers(&self) -> Vec<Raster> {
        (0..self.channels()).map(|z| self.layer(z)).collect()
    }

    /// Copy `source` into this raster with its first pixel placed at row `x`, column `y`.
    ///
    /// Only the overlap of both rasters is written. When the channel counts differ, the first
    /// `min(self.channels(), source.channels())` channels are copied and the other channels of
    /// this raster keep their values. A negative origin clips the rows or columns of `source`
    /// that would land before the first row or column.
    ///
    /// ```
    /// use image_raster::Raster;
    ///
    /// let mut canvas = Raster::filled(100, 100, 3, 0xff);
    /// canvas.stamp(&Raster::filled(50, 50, 3, 0x00), 60, 60);
    ///
    /// assert_eq!(canvas.pixel(70, 70, 1), 0x00);
    /// assert_eq!(canvas.pixel(10, 10, 1), 0xff);
    /// ```
    pub fn stamp(&mut self, source: &Raster, x: isize, y: isize) {
        let rows = match overlap(x, source.height(), self.height()) {
            Some(rows) => rows,
            None => return,
        };
        let cols = match overlap(y, source.width(), self.width()) {
            Some(cols) => cols,
            None => return,
        };

        let channels = self.channels().min(source.channels());
        if channels == 0 {
            return;
        }

        let dst_shape = self.shape;
        let src_shape = source.shape;
        let src = source.as_bytes();
        let dst = self.as_bytes_mut();

        for (dst_row, src_row) in rows {
            let (dst_col, src_col) = cols.start;
            let count = cols.len;

            if dst_shape.channels() == src_shape.channels() {
                // Whole pixel spans are contiguous in both.
                let len = count * channels;
                let d = dst_shape.offset(dst_row, dst_col, 0);
                let s = src_shape.offset(src_row, src_col, 0);
                dst[d..d + len].copy_from_slice(&src[s..s + len]);
                continue;
            }

            for i in 0..count {
                let d = dst_shape.offset(dst_row, dst_col + i, 0);
                let s = src_shape.offset(src_row, src_col + i, 0);
                dst[d..d + channels].copy_from_slice(&src[s..s + channels]);
            }
        }
    }

    /// Surround the raster with `h_border` rows above and below and `w_border` columns to the
    /// left and right, all filled with `value`.
    ///
    /// Does nothing on an empty raster.
    ///
    /// # Panics
    ///
    /// When the framed extent does not fit in a `usize`.
    pub fn add_border(&mut self, h_border: usize, w_border: usize, value: u8) {
        if self.is_empty() {
            debug!("add_border on an empty raster ignored");
            return;
        }

        let height = h_border
            .checked_mul(2)
            .and_then(|border| border.checked_add(self.height()))
            .unwrap_or_else(|| panic!("border of {h_border} rows overflows the raster height"));
        let width = w_border
            .checked_mul(2)
            .and_then(|border| border.checked_add(self.width()))
            .unwrap_or_else(|| panic!("border of {w_border} columns overflows the raster width"));

        let mut framed = Raster::filled(height, width, self.channels(), value);
        framed.stamp(self, h_border as isize, w_border as isize);

        trace!("add_border: {} -> {}", self.shape, framed.shape);
        self.swap(&mut framed);
    }

    /// Add the same border on all four sides.
    pub fn add_box_border(&mut self, border: usize, value: u8) {
        self.add_border(border, border, value)
    }

    /// Cut out a window of `height x width` pixels centered on row `center_x`, column
    /// `center_y`.
    ///
    /// The window starts `height / 2` rows above and `width / 2` columns left of the center. Parts
    /// of the window outside the raster are dropped, so near an edge the result can be smaller
    /// than requested.
    ///
    /// ```
    /// use image_raster::Raster;
    ///
    /// let mut image = Raster::with_shape(10, 10, 1);
    /// image.crop(4, 4, 1, 8).unwrap();
    /// assert_eq!((image.height(), image.width()), (3, 4));
    /// ```
    ///
    /// # Errors
    ///
    /// When the raster is empty, the center is not a pixel, or the window is empty. The raster is
    /// left unchanged.
    pub fn crop(
        &mut self,
        height: usize,
        width: usize,
        center_x: usize,
        center_y: usize,
    ) -> Result<(), TransformError> {
        if self.is_empty() {
            return Err(TransformError::Empty);
        }

        if center_x >= self.height() || center_y >= self.width() {
            debug!(
                "crop center ({center_x}, {center_y}) outside of {}",
                self.shape
            );
            return Err(TransformError::CenterOutOfBounds);
        }

        let (sx, ex) = window(center_x, height, self.height());
        let (sy, ey) = window(center_y, width, self.width());
        if sx >= ex || sy >= ey {
            return Err(TransformError::EmptyWindow);
        }

        let span = (ey - sy) * self.channels();
        let mut bytes = Vec::with_capacity((ex - sx) * span);
        for row in sx..ex {
            let start = self.offset(row, sy, 0);
            bytes.extend_from_slice(&self.as_bytes()[start..start + span]);
        }

        let mut cropped = Raster::from_vec(ex - sx, ey - sy, self.channels(), bytes);
        trace!("crop: {} -> {}", self.shape, cropped.shape);
        self.swap(&mut cropped);
        Ok(())
    }

    /// Crop a window around the center pixel `(height / 2, width / 2)`.
    pub fn center_crop(&mut self, height: usize, width: usize) -> Result<(), TransformError> {
        let (x, y) = (self.height() / 2, self.width() / 2);
        self.crop(height, width, x, y)
    }

    /// Crop around the center to a fraction of the current height and width.
    ///
    /// Ratios above one are treated as one. The resulting dimensions are truncated.
    ///
    /// # Errors
    ///
    /// When a ratio is not positive, or under the conditions of [`Raster::crop`].
    pub fn center_crop_with_ratio(
        &mut self,
        h_ratio: f32,
        w_ratio: f32,
    ) -> Result<(), TransformError> {
        // Also rejects NaN.
        if !(h_ratio > 0.0 && w_ratio > 0.0) {
            return Err(TransformError::InvalidRatio);
        }

        let height = (h_ratio.min(1.0) * self.height() as f32) as usize;
        let width = (w_ratio.min(1.0) * self.width() as f32) as usize;
        if height == self.height() && width == self.width() {
            return Ok(());
        }

        self.center_crop(height, width)
    }

    /// Crop a centered square whose side is `ratio` times the smaller dimension.
    pub fn center_squared_crop(&mut self, ratio: f32) -> Result<(), TransformError> {
        let side = (ratio * self.height().min(self.width()) as f32) as usize;
        self.center_crop(side, side)
    }

    /// The ratio of the longer to the shorter side.
    ///
    /// This is always above one for a non-square image. Square and empty rasters report `0.0`.
    pub fn aspect_ratio(&self) -> f32 {
        let (h, w) = (self.height(), self.width());
        if w < h && w > 0 {
            h as f32 / w as f32
        } else if h < w && h > 0 {
            w as f32 / h as f32
        } else {
            0.0
        }
    }
}

/// The pairs of destination and source indices along one axis where a source of `len` elements
/// placed at `origin` overlaps a destination of `bound` elements.
fn overlap(origin: isize, len: usize, bound: usize) -> Option<Span> {
    let skip = usize::try_from(origin.checked_neg()?).unwrap_or(0);
    let dst_start = usize::try_from(origin).unwrap_or(0);
    if skip >= len || dst_start >= bound {
        return None;
    }

    let count = (len - skip).min(bound - dst_start);
    Some(Span {
        start: (dst_start, skip),
        len: count,
    })
}

/// The half-open interval `[center - len/2, center - len/2 + len)` clamped to `[0, bound)`.
fn window(center: usize, len: usize, bound: usize) -> (usize, usize) {
    let start = center.saturating_sub(len / 2);
    let end = center.saturating_add(len - len / 2).min(bound);
    (start, end)
}

/// A run of aligned destination and source indices.
#[derive(Clone, Copy)]
struct Span {
    start: (usize, usize),
    len: usize,
}

impl Iterator for Span {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.len == 0 {
            return None;
        }

        let item = self.start;
        self.start = (item.0 + 1, item.1 + 1);
        self.len -= 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(height: usize, width: usize, channels: usize) -> Raster {
        let bytes = (0..height * width * channels).map(|i| i as u8).collect();
        Raster::from_vec(height, width, channels, bytes)
    }

    #[test]
    fn layers_split_channels() {
        let image = gradient(10, 10, 3);
        let layers = image.layers();
        assert_eq!(layers.len(), 3);

        for (z, layer) in layers.iter().enumerate() {
            assert_eq!(layer.shape(), crate::Shape::new(10, 10, 1));
            for (i, &sample) in layer.as_bytes().iter().enumerate() {
                assert_eq!(sample, image.as_bytes()[i * 3 + z]);
            }
        }

        assert!(image.layer(3).is_empty());
        assert!(Raster::new().layers().is_empty());
    }

    #[test]
    fn stamp_inside() {
        let mut canvas = Raster::filled(100, 100, 3, 0xff);
        canvas.stamp(&Raster::filled(50, 50, 3, 0x00), 60, 60);

        for z in 0..3 {
            assert_eq!(canvas.pixel(70, 70, z), 0x00);
            assert_eq!(canvas.pixel(99, 99, z), 0x00);
            assert_eq!(canvas.pixel(10, 10, z), 0xff);
            assert_eq!(canvas.pixel(59, 70, z), 0xff);
        }
    }

    #[test]
    fn stamp_negative_origin_clips() {
        let mut canvas = Raster::filled(4, 4, 1, 0);
        let source = gradient(3, 3, 1);
        canvas.stamp(&source, -1, -2);

        // Source rows 1..3 and column 2 land in the top-left corner.
        assert_eq!(canvas.pixel(0, 0, 0), source.pixel(1, 2, 0));
        assert_eq!(canvas.pixel(1, 0, 0), source.pixel(2, 2, 0));
        assert_eq!(canvas.pixel(0, 1, 0), 0);
        assert_eq!(canvas.pixel(2, 0, 0), 0);
    }

    #[test]
    fn stamp_fully_outside_is_noop() {
        let mut canvas = Raster::filled(4, 4, 1, 7);
        let before = canvas.clone();
        canvas.stamp(&Raster::filled(2, 2, 1, 0), -2, 0);
        canvas.stamp(&Raster::filled(2, 2, 1, 0), 0, 4);
        canvas.stamp(&Raster::new(), 0, 0);
        assert_eq!(canvas, before);
    }

    #[test]
    fn stamp_channel_mismatch() {
        let mut canvas = Raster::filled(2, 2, 4, 9);
        canvas.stamp(&Raster::filled(2, 2, 2, 1), 0, 0);
        assert_eq!(canvas.as_bytes()[..4], [1, 1, 9, 9]);

        let mut narrow = Raster::filled(2, 2, 1, 9);
        narrow.stamp(&gradient(2, 2, 3), 0, 0);
        assert_eq!(narrow.as_bytes(), &[0, 3, 6, 9]);
    }

    #[test]
    fn border_then_crop_roundtrip() {
        let original = gradient(5, 7, 3);
        let mut image = original.clone();
        image.add_border(2, 2, 0xff);

        assert_eq!(image.shape(), crate::Shape::new(9, 11, 3));
        assert_eq!(image.pixel(0, 0, 0), 0xff);
        assert_eq!(image.pixel(8, 10, 2), 0xff);

        image.center_crop(5, 7).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    #[should_panic(expected = "overflows the raster height")]
    fn oversized_border_panics() {
        let mut image = Raster::filled(2, 2, 1, 0);
        image.add_border(usize::MAX / 2 + 1, 0, 0);
    }

    #[test]
    fn asymmetric_border() {
        let mut image = Raster::filled(2, 2, 1, 1);
        image.add_border(1, 3, 0);
        assert_eq!(image.shape(), crate::Shape::new(4, 8, 1));
        assert_eq!(image.pixel(1, 3, 0), 1);
        assert_eq!(image.pixel(1, 2, 0), 0);

        let mut empty = Raster::new();
        empty.add_box_border(3, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn crop_fits() {
        let mut image = Raster::with_shape(200, 300, 3);
        image.crop(100, 50, 100, 100).unwrap();
        assert_eq!(image.shape(), crate::Shape::new(100, 50, 3));
    }

    #[test]
    fn crop_content() {
        let original = gradient(6, 6, 1);
        let mut image = original.clone();
        image.crop(2, 2, 3, 3).unwrap();
        assert_eq!(image.as_bytes(), &[
            original.pixel(2, 2, 0),
            original.pixel(2, 3, 0),
            original.pixel(3, 2, 0),
            original.pixel(3, 3, 0),
        ]);
    }

    #[test]
    fn crop_clamps_near_edges() {
        let mut image = gradient(10, 10, 2);
        image.crop(8, 8, 0, 9).unwrap();
        assert_eq!((image.height(), image.width()), (4, 5));

        // A window larger than the image degrades to the whole image.
        let mut image = gradient(10, 10, 2);
        let before = image.clone();
        image.center_crop(40, 40).unwrap();
        assert_eq!(image, before);
    }

    #[test]
    fn crop_failures_leave_raster_unchanged() {
        let mut image = gradient(4, 4, 1);
        let before = image.clone();

        assert_eq!(image.crop(2, 2, 4, 0), Err(TransformError::CenterOutOfBounds));
        assert_eq!(image.crop(2, 2, 0, 4), Err(TransformError::CenterOutOfBounds));
        assert_eq!(image.crop(0, 2, 1, 1), Err(TransformError::EmptyWindow));
        assert_eq!(image, before);

        assert_eq!(Raster::new().center_crop(1, 1), Err(TransformError::Empty));
    }

    #[test]
    fn ratio_crop() {
        let mut image = Raster::with_shape(100, 50, 1);
        assert_eq!(image.center_crop_with_ratio(0.0, 1.0), Err(TransformError::InvalidRatio));
        assert_eq!(image.center_crop_with_ratio(f32::NAN, 1.0), Err(TransformError::InvalidRatio));

        image.center_crop_with_ratio(2.0, 1.0).unwrap();
        assert_eq!((image.height(), image.width()), (100, 50));

        image.center_crop_with_ratio(0.5, 0.5).unwrap();
        assert_eq!((image.height(), image.width()), (50, 25));
    }

    #[test]
    fn squared_crop() {
        let mut image = Raster::with_shape(40, 60, 3);
        image.center_squared_crop(1.0).unwrap();
        assert_eq!((image.height(), image.width()), (40, 40));

        image.center_squared_crop(0.5).unwrap();
        assert_eq!((image.height(), image.width()), (20, 20));
    }

    #[test]
    fn aspect() {
        assert_eq!(Raster::with_shape(20, 10, 1).aspect_ratio(), 2.0);
        assert_eq!(Raster::with_shape(10, 40, 1).aspect_ratio(), 4.0);
        assert_eq!(Raster::with_shape(10, 10, 1).aspect_ratio(), 0.0);
        assert_eq!(Raster::new().aspect_ratio(), 0.0);
    }

    #[test]
    fn overlap_spans() {
        let span = overlap(-2, 5, 10).unwrap();
        assert_eq!(span.collect::<Vec<_>>(), [(0, 2), (1, 3), (2, 4)]);

        let span = overlap(8, 5, 10).unwrap();
        assert_eq!(span.collect::<Vec<_>>(), [(8, 0), (9, 1)]);

        assert!(overlap(-5, 5, 10).is_none());
        assert!(overlap(10, 5, 10).is_none());
    }
}
