// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Defines the `Raster` container.
//!
//! Besides construction and sample access, which live here, the geometric transforms are
//! implemented in the `geometry` and `scale` submodules and the codec bridge in
//! [`crate::codec`]. All of them operate on the same type.
mod geometry;
mod scale;

use std::sync::Arc;
use std::{fmt, mem, ops};

use crate::shape::Shape;
use crate::storage::Storage;

pub use self::geometry::TransformError;

/// A dense `height x width x channels` matrix of 8-bit samples.
///
/// The raster is a plain value: cloning it produces an independent deep copy, moving it moves the
/// allocation. The bytes are laid out row-major, with all channels of a pixel adjacent, and
/// sample `(x, y, z)` is at row `x`, column `y`, channel `z`.
///
/// ## Ownership
///
/// The backing bytes are either owned exclusively or shared through a reference count. Shared
/// storage appears when a decoded image is adopted without a copy and when calling
/// [`Raster::share`]. Writing to a raster always goes through `&mut self` and first detaches
/// shared storage into an owned copy, hence aliasing rasters never observe each other's writes.
///
/// ## Failures
///
/// Violated preconditions, such as zero dimensions or out-of-bounds coordinates, panic. These
/// are programming errors. Operational failures such as an undecodable file or a crop window
/// that lies entirely outside the image are reported as `Err` and leave the raster unchanged.
/// Transforms that change the shape build a complete replacement first and only then swap it in,
/// so a raster is never observed in a half-transformed state.
///
/// ## Examples
///
/// ```
/// use image_raster::Raster;
///
/// let mut image = Raster::filled(100, 100, 3, 0xff);
/// for x in 50..100 {
///     for y in 0..100 {
///         for z in 0..3 {
///             image[(x, y, z)] = 0x00;
///         }
///     }
/// }
///
/// assert_eq!(image.pixel(60, 10, 0), 0x00);
/// assert_eq!(image.pixel(10, 10, 0), 0xff);
/// ```
#[derive(Default)]
pub struct Raster {
    shape: Shape,
    storage: Storage,
}

impl Raster {
    /// Create an empty raster, holding no allocation.
    pub fn new() -> Self {
        Raster::default()
    }

    /// Allocate a zeroed raster.
    ///
    /// # Panics
    ///
    /// When any of the dimensions is zero.
    pub fn with_shape(height: usize, width: usize, channels: usize) -> Self {
        let shape = Shape::new(height, width, channels);
        Raster {
            storage: Storage::new(shape.len()),
            shape,
        }
    }

    /// Allocate a raster with every byte set to `value`.
    ///
    /// # Panics
    ///
    /// When any of the dimensions is zero.
    pub fn filled(height: usize, width: usize, channels: usize, value: u8) -> Self {
        let shape = Shape::new(height, width, channels);
        Raster {
            storage: Storage::filled(shape.len(), value),
            shape,
        }
    }

    /// Create a raster by copying raw bytes.
    ///
    /// # Panics
    ///
    /// When any of the dimensions is zero or `bytes` does not have exactly
    /// `height * width * channels` elements.
    pub fn from_bytes(height: usize, width: usize, channels: usize, bytes: &[u8]) -> Self {
        Self::from_vec(height, width, channels, bytes.to_vec())
    }

    /// Create a raster taking ownership of raw bytes, without copying.
    ///
    /// # Panics
    ///
    /// Under the same conditions as [`Raster::from_bytes`].
    pub fn from_vec(height: usize, width: usize, channels: usize, bytes: Vec<u8>) -> Self {
        let shape = Shape::new(height, width, channels);
        assert_eq!(
            bytes.len(),
            shape.len(),
            "byte length does not match {shape}"
        );

        Raster {
            shape,
            storage: Storage::Owned(bytes),
        }
    }

    /// Adopt an allocation produced elsewhere, by reference.
    pub(crate) fn from_shared(shape: Shape, bytes: Arc<Vec<u8>>) -> Self {
        assert!(!shape.is_empty(), "shared storage requires a non-empty shape");
        assert_eq!(bytes.len(), shape.len(), "byte length does not match {shape}");

        Raster {
            shape,
            storage: Storage::from(bytes),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape.height()
    }

    pub fn width(&self) -> usize {
        self.shape.width()
    }

    pub fn channels(&self) -> usize {
        self.shape.channels()
    }

    /// The number of bytes, `height * width * channels`.
    pub fn size(&self) -> usize {
        self.shape.len()
    }

    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.shape.len(), self.storage.len());
        self.shape.is_empty()
    }

    /// Check that both rasters have the same height, width and channel count.
    pub fn same_shape(&self, other: &Raster) -> bool {
        self.shape == other.shape
    }

    /// Reset to the empty raster, releasing this handle on the bytes.
    pub fn clear(&mut self) {
        *self = Raster::default();
    }

    /// Exchange contents with another raster.
    pub fn swap(&mut self, other: &mut Raster) {
        mem::swap(self, other);
    }

    /// Move the contents out, leaving an empty raster behind.
    pub fn take(&mut self) -> Raster {
        mem::take(self)
    }

    /// Create another handle to the same bytes.
    ///
    /// This does not copy. The two rasters are independent values nevertheless: the first one
    /// to be written to detaches into its own copy.
    pub fn share(&mut self) -> Raster {
        if self.is_empty() {
            return Raster::new();
        }

        Raster {
            shape: self.shape,
            storage: self.storage.share(),
        }
    }

    /// Query if this raster currently aliases bytes of another raster.
    pub fn is_shared(&self) -> bool {
        self.storage.is_shared()
    }

    /// Query if two rasters refer to the very same allocation.
    pub fn ptr_eq(&self, other: &Raster) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    /// The samples, in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_slice()
    }

    /// The samples for writing, detaching from any shared storage first.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.storage.make_mut()
    }

    /// Unwrap the samples, copying only if the bytes are still shared.
    pub fn into_vec(self) -> Vec<u8> {
        self.storage.into_vec()
    }

    /// View the samples as whole pixels of `N` channels.
    ///
    /// Returns `None` unless `N` is exactly the channel count.
    ///
    /// ```
    /// use image_raster::Raster;
    ///
    /// let image = Raster::filled(2, 2, 3, 0x20);
    /// let pixels = image.pixels::<3>().expect("three channels");
    /// assert_eq!(pixels, &[[0x20; 3]; 4]);
    /// assert!(image.pixels::<4>().is_none());
    /// ```
    pub fn pixels<const N: usize>(&self) -> Option<&[[u8; N]]>
    where
        [u8; N]: bytemuck::Pod,
    {
        if N != self.channels() || self.is_empty() {
            return None;
        }

        bytemuck::try_cast_slice(self.as_bytes()).ok()
    }

    /// Mutable variant of [`Raster::pixels`].
    pub fn pixels_mut<const N: usize>(&mut self) -> Option<&mut [[u8; N]]>
    where
        [u8; N]: bytemuck::Pod,
    {
        if N != self.channels() || self.is_empty() {
            return None;
        }

        bytemuck::try_cast_slice_mut(self.as_bytes_mut()).ok()
    }

    /// Check whether a coordinate addresses a sample. Negative coordinates never do.
    pub fn in_bounds(&self, x: isize, y: isize, z: isize) -> bool {
        self.shape.contains(x, y, z)
    }

    /// The linear byte index of sample `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// When the coordinate is out of bounds, in particular on an empty raster.
    pub fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        self.shape.offset(x, y, z)
    }

    /// Read a sample.
    ///
    /// # Panics
    ///
    /// When the coordinate is out of bounds.
    pub fn pixel(&self, x: usize, y: usize, z: usize) -> u8 {
        self.as_bytes()[self.offset(x, y, z)]
    }

    /// Get a sample for writing.
    ///
    /// # Panics
    ///
    /// When the coordinate is out of bounds.
    pub fn pixel_mut(&mut self, x: usize, y: usize, z: usize) -> &mut u8 {
        let offset = self.offset(x, y, z);
        &mut self.as_bytes_mut()[offset]
    }

    /// Read a sample, treating everything outside the raster as zero.
    pub fn pixel_or_zero(&self, x: isize, y: isize, z: isize) -> u8 {
        if !self.in_bounds(x, y, z) {
            return 0;
        }

        // In bounds means all coordinates are non-negative.
        self.pixel(x as usize, y as usize, z as usize)
    }

    /// Overwrite a sample.
    ///
    /// # Panics
    ///
    /// When the coordinate is out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, z: usize, value: u8) {
        *self.pixel_mut(x, y, z) = value;
    }

    /// Brighten a sample, saturating at `0xff`.
    pub fn add_pixel(&mut self, x: usize, y: usize, z: usize, delta: u8) {
        let sample = self.pixel_mut(x, y, z);
        *sample = sample.saturating_add(delta);
    }

    /// Darken a sample, saturating at `0x00`.
    pub fn sub_pixel(&mut self, x: usize, y: usize, z: usize, delta: u8) {
        let sample = self.pixel_mut(x, y, z);
        *sample = sample.saturating_sub(delta);
    }

    /// Set every sample to the same value.
    pub fn fill(&mut self, value: u8) {
        if self.is_empty() {
            return;
        }

        self.as_bytes_mut().fill(value);
    }

    pub fn set_white(&mut self) {
        self.fill(0xff);
    }

    pub fn set_black(&mut self) {
        self.fill(0x00);
    }
}

impl Clone for Raster {
    /// Deep copy. The clone is always exclusively owned, even when `self` is shared.
    fn clone(&self) -> Self {
        Raster {
            shape: self.shape,
            storage: self.storage.to_owned(),
        }
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Raster {}

impl ops::Index<(usize, usize, usize)> for Raster {
    type Output = u8;

    fn index(&self, (x, y, z): (usize, usize, usize)) -> &u8 {
        &self.as_bytes()[self.offset(x, y, z)]
    }
}

impl ops::IndexMut<(usize, usize, usize)> for Raster {
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut u8 {
        self.pixel_mut(x, y, z)
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Raster")
            .field("shape", &self.shape)
            .field("shared", &matches!(self.storage, Storage::Shared(_)))
            .finish()
    }
}

impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (size:{})", self.shape, self.size())
    }
}
