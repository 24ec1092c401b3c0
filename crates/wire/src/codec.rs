//! Little-endian scalar access at fixed offsets.
//!
//! [`read_at`] reads one value anywhere in a buffer without touching the rest
//! of it (header peeking, car-index checks). [`ByteReader`] walks a layout
//! field by field; [`ByteWriter`] is its mirror for the encoders.

use crate::error::DecodeError;

/// A fixed-width little-endian value that can be sliced out of a datagram.
pub trait LeScalar: Sized + Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decode from exactly [`Self::WIDTH`] bytes. `None` on a length mismatch.
    fn from_le_slice(bytes: &[u8]) -> Option<Self>;

    /// Append the little-endian encoding to `out`.
    fn put_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_le_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl LeScalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn from_le_slice(bytes: &[u8]) -> Option<Self> {
                bytes.try_into().ok().map(<$ty>::from_le_bytes)
            }

            #[inline]
            fn put_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

impl_le_scalar!(u8, i8, u16, i16, u32, i32, u64, f32);

/// Read one `T` at `offset`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfBounds`] when `offset + T::WIDTH` exceeds the
/// buffer.
#[inline]
pub fn read_at<T: LeScalar>(data: &[u8], offset: usize) -> Result<T, DecodeError> {
    let out_of_bounds = || DecodeError::OutOfBounds {
        offset,
        width: T::WIDTH,
        len: data.len(),
    };
    let end = offset.checked_add(T::WIDTH).ok_or_else(out_of_bounds)?;
    data.get(offset..end)
        .and_then(T::from_le_slice)
        .ok_or_else(out_of_bounds)
}

/// Cursor-style byte reader for little-endian binary data.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, pos: offset }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn scalar<T: LeScalar>(&mut self) -> Result<T, DecodeError> {
        let v = read_at::<T>(self.data, self.pos)?;
        self.pos = self.pos.saturating_add(T::WIDTH);
        Ok(v)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        self.scalar()
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        self.scalar()
    }

    #[inline]
    pub fn u16_le(&mut self) -> Result<u16, DecodeError> {
        self.scalar()
    }

    #[inline]
    pub fn u32_le(&mut self) -> Result<u32, DecodeError> {
        self.scalar()
    }

    #[inline]
    pub fn u64_le(&mut self) -> Result<u64, DecodeError> {
        self.scalar()
    }

    /// Raw IEEE-754 value; NaN and infinities pass through untouched.
    #[inline]
    pub fn f32_le(&mut self) -> Result<f32, DecodeError> {
        self.scalar()
    }

    pub fn u8_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let out_of_bounds = DecodeError::OutOfBounds {
            offset: self.pos,
            width: N,
            len: self.data.len(),
        };
        let end = self.pos.checked_add(N).ok_or(out_of_bounds.clone())?;
        let bytes: [u8; N] = self
            .data
            .get(self.pos..end)
            .and_then(|b| b.try_into().ok())
            .ok_or(out_of_bounds)?;
        self.pos = end;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        let end = self.pos.saturating_add(n);
        if end > self.data.len() {
            return Err(DecodeError::OutOfBounds {
                offset: self.pos,
                width: n,
                len: self.data.len(),
            });
        }
        self.pos = end;
        Ok(())
    }
}

/// Append-only little-endian writer used by the encoders and packet builders.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put<T: LeScalar>(&mut self, value: T) -> &mut Self {
        value.put_le(&mut self.buf);
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Zero-pad up to `len` bytes total. No-op when already that long.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
