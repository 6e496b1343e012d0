// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Resampling of raster bytes to a new extent.
//!
//! The kernels come from the `image` crate. Every channel is filtered independently, as a plane
//! of 8-bit samples, which preserves arbitrary channel counts and treats an alpha channel no
//! different from color.

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::shape::Shape;

/// The reconstruction filter used when resizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Nearest neighbor. Fast and blocky, never introduces new sample values.
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Catmull-Rom cubic spline, a sharp general purpose choice.
    #[default]
    CatmullRom,
    /// Gaussian, soft.
    Gaussian,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl Filter {
    fn to_image_filter(self) -> FilterType {
        match self {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resample `src` of shape `src_shape` into `dst` of shape `dst_shape`.
///
/// Both shapes must be non-empty with the same channel count and the slices exactly as long as
/// their shapes.
pub(crate) fn resample(
    src: &[u8],
    src_shape: Shape,
    dst: &mut [u8],
    dst_shape: Shape,
    filter: Filter,
) {
    assert_eq!(src_shape.channels(), dst_shape.channels());
    assert_eq!(src.len(), src_shape.len());
    assert_eq!(dst.len(), dst_shape.len());

    let channels = src_shape.channels();
    let (src_w, src_h) = extent(src_shape);
    let (dst_w, dst_h) = extent(dst_shape);
    let filter = filter.to_image_filter();

    for z in 0..channels {
        let plane: Vec<u8> = if channels == 1 {
            src.to_vec()
        } else {
            src.iter().skip(z).step_by(channels).copied().collect()
        };

        let plane = match GrayImage::from_raw(src_w, src_h, plane) {
            Some(plane) => plane,
            None => unreachable!("plane length matches its extent"),
        };

        let scaled = imageops::resize(&plane, dst_w, dst_h, filter);
        for (target, sample) in dst.iter_mut().skip(z).step_by(channels).zip(scaled.iter()) {
            *target = *sample;
        }
    }
}

/// Width and height as the `image` crate expects them.
fn extent(shape: Shape) -> (u32, u32) {
    match (u32::try_from(shape.width()), u32::try_from(shape.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => panic!("{shape} exceeds the resampler's dimension limit"),
    }
}
