//! Bounded byte storage shared by the receive and transmit paths.
//!
//! Both buffers of the driver have a fixed capacity known at compile time.
//! [`FrameBytes`] couples such an array with an explicit logical length so no
//! code outside this module needs to track indices by hand.

/// Fixed-capacity byte container with an explicit logical length.
///
/// Writes beyond the capacity are refused rather than truncated silently.
/// Equality looks at the populated bytes only.
#[derive(Debug, Clone, Copy)]
pub struct FrameBytes<const N: usize> {
    len: usize,
    data: [u8; N],
}

impl<const N: usize> Default for FrameBytes<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for FrameBytes<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for FrameBytes<N> {}

impl<const N: usize> FrameBytes<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            len: 0,
            data: [0; N],
        }
    }

    /// Maximum number of bytes the buffer can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of valid bytes stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks whether another byte can be appended.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Reset the buffer.
    #[inline]
    pub fn clear(&mut self) {
        // Stale bytes stay in `data`; nothing reads past `len`.
        self.len = 0;
    }

    /// Append one byte. Returns `false` when the buffer is already full.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.len] = byte;
        self.len += 1;
        true
    }

    /// Replace the content with `slice`. Returns `false` (and leaves the buffer
    /// untouched) when `slice` does not fit.
    #[inline]
    pub fn copy_from_slice(&mut self, slice: &[u8]) -> bool {
        if slice.len() > N {
            return false;
        }
        self.data[..slice.len()].copy_from_slice(slice);
        self.len = slice.len();
        true
    }

    /// Bounds-checked read of a populated byte.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_slice().get(index).copied()
    }

    /// Immutable view over the populated bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}
