// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Byte storage backing a raster.
use std::mem;
use std::sync::Arc;

/// Allocates and manages the bytes of a raster.
///
/// The bytes are either exclusively owned by one raster, or shared between several through a
/// reference count. Shared storage is produced when adopting memory handed over by the decoder
/// and by [`Raster::share`](crate::Raster::share). Its lifetime is that of the longest holder,
/// and the allocation is released by whichever container produced it.
///
/// Keeping track of the logical length is the obligation of the raster. The storage only ever
/// holds exactly the bytes it was created with.
#[derive(Debug)]
pub(crate) enum Storage {
    Owned(Vec<u8>),
    Shared(Arc<Vec<u8>>),
}

impl Storage {
    pub fn new(length: usize) -> Self {
        Storage::filled(length, 0)
    }

    pub fn filled(length: usize, value: u8) -> Self {
        Storage::Owned(vec![value; length])
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(bytes) => bytes,
            Storage::Shared(bytes) => bytes,
        }
    }

    /// Get a mutable view of the bytes, detaching from other holders first.
    ///
    /// Shared storage whose reference count has dropped to one is reused without a copy.
    pub fn make_mut(&mut self) -> &mut [u8] {
        match self {
            Storage::Owned(bytes) => bytes,
            Storage::Shared(bytes) => Arc::make_mut(bytes).as_mut_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Turn this storage into a shared one and return another handle to it.
    pub fn share(&mut self) -> Self {
        if let Storage::Owned(bytes) = self {
            let bytes = mem::take(bytes);
            *self = Storage::Shared(Arc::new(bytes));
        }

        match self {
            Storage::Shared(bytes) => Storage::Shared(Arc::clone(bytes)),
            Storage::Owned(_) => unreachable!("converted to shared storage above"),
        }
    }

    /// Query if another holder may observe these bytes.
    pub fn is_shared(&self) -> bool {
        match self {
            Storage::Owned(_) => false,
            Storage::Shared(bytes) => Arc::strong_count(bytes) > 1,
        }
    }

    /// Query if two storages are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Storage::Shared(a), Storage::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Copy the data into an owned buffer.
    pub fn to_owned(&self) -> Self {
        Storage::Owned(self.as_slice().to_vec())
    }

    /// Unwrap into a vector, copying only if other holders remain.
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Storage::Owned(bytes) => bytes,
            Storage::Shared(bytes) => Arc::try_unwrap(bytes).unwrap_or_else(|arc| (*arc).clone()),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Owned(Vec::new())
    }
}

impl From<Arc<Vec<u8>>> for Storage {
    fn from(bytes: Arc<Vec<u8>>) -> Self {
        Storage::Shared(bytes)
    }
}
