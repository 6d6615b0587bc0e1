//! Read-only view over one validated I-Bus frame.
//!
//! A [`Message`] owns a copy of the frame bytes, so it outlives any later
//! activity on the receive buffer it was extracted from.
//!
//! # Frame layout
//!
//! ```text
//! byte 0        source module id
//! byte 1        length (destination .. checksum, inclusive)
//! byte 2        destination module id
//! byte 3..n     payload (length - 2 bytes)
//! byte n+1      checksum
//! ```
use crate::core::FrameBytes;
use crate::infra::checksum::frame_checksum_matches;
use crate::protocol::transport::{FRAME_OVERHEAD, MAX_RX_FRAME_LEN, MIN_FRAME_LEN};

/// Immutable snapshot of a complete, checksum-valid frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    frame: FrameBytes<MAX_RX_FRAME_LEN>,
}

impl Message {
    /// Validate `frame` and copy it into a new message.
    ///
    /// Returns `None` unless the sequence holds exactly `length + 2` bytes, is
    /// longer than four bytes, and ends with the matching checksum.
    pub fn from_frame(frame: &[u8]) -> Option<Self> {
        if !is_complete(frame) || !frame_checksum_matches(frame) {
            return None;
        }
        let mut bytes = FrameBytes::new();
        // Length bytes above 253 describe frames larger than the receive buffer.
        if !bytes.copy_from_slice(frame) {
            return None;
        }
        Some(Self { frame: bytes })
    }

    /// Sender module id.
    #[inline]
    pub fn source(&self) -> u8 {
        self.byte(0)
    }

    /// Raw length byte: destination, payload and checksum bytes.
    #[inline]
    pub fn length(&self) -> u8 {
        self.byte(1)
    }

    /// Receiver module id.
    #[inline]
    pub fn destination(&self) -> u8 {
        self.byte(2)
    }

    /// Trailing checksum byte.
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.byte(self.frame.len() - 1)
    }

    /// Payload bytes between the destination and the checksum.
    pub fn payload(&self) -> &[u8] {
        let frame = self.frame.as_slice();
        &frame[3..frame.len() - 1]
    }

    /// Payload byte at `index`, or `0x00` when `index` is past the payload.
    ///
    /// Valid offsets are `0..length - 2`. The checksum byte that follows the
    /// payload is never returned here; use [`checksum`](Self::checksum).
    pub fn payload_byte(&self, index: usize) -> u8 {
        self.payload().get(index).copied().unwrap_or(0x00)
    }

    /// The whole frame, checksum included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_slice()
    }

    fn byte(&self, index: usize) -> u8 {
        self.frame.get(index).unwrap_or(0x00)
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Message {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Message {{ src: {=u8:#04x}, dst: {=u8:#04x}, payload: {=[u8]:x} }}",
            self.source(),
            self.destination(),
            self.payload()
        )
    }
}

/// Declared length agrees with the number of bytes and the minimum size is met.
#[inline]
pub(crate) fn is_complete(frame: &[u8]) -> bool {
    frame.len() >= MIN_FRAME_LEN
        && frame.len() == frame[1] as usize + FRAME_OVERHEAD
}
