//! Fixed-capacity tensor budget.
//!
//! tract owns the storage of the tensors it computes; [`TensorArena`]
//! decides whether they may exist at all. Every intermediate tensor of
//! the optimised plan reserves an aligned span, bump-style, and setup
//! fails if the total does not fit the capacity chosen at construction.
//! The capacity never grows.

use crate::error::ArenaError;

/// Alignment of every reserved span, in bytes.
pub const ALIGNMENT_BYTES: usize = 16;

/// A reserved byte range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaSpan {
    offset: usize,
    len: usize,
}

impl ArenaSpan {
    /// Offset from the start of the arena, in bytes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Bump accounting over a fixed number of bytes.
///
/// ```
/// use ember_runtime::TensorArena;
///
/// let mut arena = TensorArena::new(64);
/// let a = arena.reserve(4).unwrap();
/// let b = arena.reserve(8).unwrap();
/// assert_eq!((a.offset(), b.offset()), (0, 16));
/// assert_eq!(arena.used_bytes(), 24);
/// ```
#[derive(Clone, Debug)]
pub struct TensorArena {
    capacity_bytes: usize,
    cursor: usize,
}

impl TensorArena {
    /// An empty arena of `capacity_bytes`.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            cursor: 0,
        }
    }

    /// Reserve `bytes` at the next aligned offset.
    ///
    /// # Errors
    ///
    /// [`ArenaError::CapacityExceeded`] if the aligned request does not
    /// fit. A failed reservation leaves the cursor untouched.
    pub fn reserve(&mut self, bytes: usize) -> Result<ArenaSpan, ArenaError> {
        let start = align_up(self.cursor).ok_or(ArenaError::SizeOverflow { bytes })?;
        let end = start
            .checked_add(bytes)
            .ok_or(ArenaError::SizeOverflow { bytes })?;
        if end > self.capacity_bytes {
            return Err(ArenaError::CapacityExceeded {
                requested: end - self.cursor,
                available: self.available_bytes(),
                capacity: self.capacity_bytes,
            });
        }
        self.cursor = end;
        Ok(ArenaSpan { offset: start, len: bytes })
    }

    /// Forget every reservation.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes reserved so far, alignment padding included.
    pub fn used_bytes(&self) -> usize {
        self.cursor
    }

    /// Capacity as passed to [`new()`](Self::new).
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Bytes left before alignment of the next request.
    pub fn available_bytes(&self) -> usize {
        self.capacity_bytes - self.cursor
    }
}

fn align_up(offset: usize) -> Option<usize> {
    let rem = offset % ALIGNMENT_BYTES;
    if rem == 0 {
        Some(offset)
    } else {
        offset.checked_add(ALIGNMENT_BYTES - rem)
    }
}
