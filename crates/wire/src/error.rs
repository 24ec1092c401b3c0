//! Decode errors.

use thiserror::Error;

/// Failure to slice a field or structure out of a datagram.
///
/// Decoders return this instead of panicking; the tracker drops the packet
/// and keeps its state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ends before the structure does.
    #[error("{what} too short: {got} bytes (need {need})")]
    TooShort {
        what: &'static str,
        need: usize,
        got: usize,
    },

    /// A single scalar read ran past the end of the buffer.
    #[error("out of bounds: {width}-byte read at offset {offset} (buffer is {len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// A per-car array was indexed past the grid size.
    #[error("car index {index} out of range (max {max})")]
    CarIndexOutOfRange { index: usize, max: usize },
}

impl DecodeError {
    pub(crate) fn too_short(what: &'static str, need: usize, got: usize) -> Self {
        Self::TooShort { what, need, got }
    }
}
