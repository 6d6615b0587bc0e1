//! I-Bus frame assembler: accumulates bytes heard on the wire, drops stale or
//! runaway partial frames, validates complete frames, and swallows the echo of
//! the driver's own transmissions.
//!
//! ```text
//! EMPTY ──byte──▶ ACCUMULATING ──len+2 bytes──▶ COMPLETE ─┬─ checksum ok ──▶ taken  ──▶ EMPTY
//!                   │                                     └─ mismatch ─────▶ dropped ──▶ EMPTY
//!                   └─ > 254 bytes / ≥ 8 ms silence ──────────────────────▶ dropped ──▶ EMPTY
//! ```
//!
//! There is no terminal failure state: every path ends with an empty buffer
//! ready for the next byte.
use crate::core::FrameBytes;
use crate::error::DiscardReason;
use crate::infra::checksum::frame_checksum_matches;
use crate::protocol::message::{is_complete, Message};
use crate::protocol::transport::traits::clock::elapsed_ms;
use crate::protocol::transport::traits::serial_port::SerialPort;
use crate::protocol::transport::{
    MAX_RX_FRAME_LEN, RX_INTER_BYTE_TIMEOUT_MS, RX_OVERFLOW_THRESHOLD,
};

//==================================================================================Enums and Structs
/// Fate of one byte handed to [`BusReceiver::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOutcome {
    /// Appended to the receive buffer.
    Buffered,
    /// Recognized as the echo of our own transmission and dropped.
    EchoSuppressed,
}

/// State of the receive buffer as seen by [`BusReceiver::check_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameCheck {
    /// More bytes are needed (or the buffer is empty).
    Incomplete,
    /// A complete, checksum-valid frame is waiting to be taken.
    Ready,
    /// The buffered bytes were dropped.
    Discarded(DiscardReason),
}

/// Running counters, mostly useful for bus diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverStats {
    pub frames_received: u32,
    pub checksum_errors: u32,
    pub overflows: u32,
    pub timeouts: u32,
    pub echo_bytes_suppressed: u32,
    /// Transmissions whose echo stopped coming back before it was complete.
    pub echo_timeouts: u32,
}

/// Receive side of the link.
#[derive(Debug, Clone)]
pub struct BusReceiver {
    buffer: FrameBytes<MAX_RX_FRAME_LEN>,
    /// Time of the last byte heard on the wire, echo bytes included.
    last_byte_ms: u32,
    /// Bytes of our own transmission still expected back from the wire.
    echo_remaining: usize,
    /// Time of the flush or of the last echo byte, whichever is later.
    echo_since_ms: u32,
    last_discard: Option<DiscardReason>,
    stats: ReceiverStats,
}

impl Default for BusReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl BusReceiver {
    /// Create an empty receiver.
    pub const fn new() -> Self {
        Self {
            buffer: FrameBytes::new(),
            last_byte_ms: 0,
            echo_remaining: 0,
            echo_since_ms: 0,
            last_discard: None,
            stats: ReceiverStats {
                frames_received: 0,
                checksum_errors: 0,
                overflows: 0,
                timeouts: 0,
                echo_bytes_suppressed: 0,
                echo_timeouts: 0,
            },
        }
    }

    /// Number of bytes currently buffered.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes accumulated so far.
    #[inline]
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Timestamp of the last byte heard on the wire.
    #[inline]
    pub fn last_byte_ms(&self) -> u32 {
        self.last_byte_ms
    }

    /// Echo bytes still to be swallowed after our last transmission.
    #[inline]
    pub fn echo_remaining(&self) -> usize {
        self.echo_remaining
    }

    /// Most recent reason the buffer was dropped, if any.
    #[inline]
    pub fn last_discard(&self) -> Option<DiscardReason> {
        self.last_discard
    }

    #[inline]
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Arm echo suppression for `count` bytes written to the wire at `now_ms`.
    pub fn expect_echo(&mut self, count: usize, now_ms: u32) {
        self.echo_remaining = count;
        self.echo_since_ms = now_ms;
    }

    //==================================================================================Ingestion
    /// Drop the buffered bytes if they overflowed or went stale.
    ///
    /// Run before every append, and on every poll so a partial frame does not
    /// linger while the wire is quiet. An echo that stops arriving for the
    /// inter-byte timeout is abandoned here as well, so the remaining count
    /// cannot swallow the next foreign frame.
    pub fn expire(&mut self, now_ms: u32) -> Option<DiscardReason> {
        if self.echo_remaining > 0
            && elapsed_ms(now_ms, self.echo_since_ms) >= RX_INTER_BYTE_TIMEOUT_MS
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("Echo incomplete, {} bytes never came back", self.echo_remaining);
            self.echo_remaining = 0;
            self.stats.echo_timeouts = self.stats.echo_timeouts.wrapping_add(1);
        }
        if self.buffer.len() > RX_OVERFLOW_THRESHOLD {
            self.discard(DiscardReason::Overflow);
            return Some(DiscardReason::Overflow);
        }
        if !self.buffer.is_empty()
            && elapsed_ms(now_ms, self.last_byte_ms) >= RX_INTER_BYTE_TIMEOUT_MS
        {
            self.discard(DiscardReason::Timeout);
            return Some(DiscardReason::Timeout);
        }
        None
    }

    /// Append one byte received at `now_ms`.
    ///
    /// Returns the reason when a previous partial frame had to be dropped
    /// first; the new byte is buffered either way.
    pub fn ingest(&mut self, byte: u8, now_ms: u32) -> Option<DiscardReason> {
        let dropped = self.expire(now_ms);
        // `expire` leaves at most 254 bytes, so there is always room.
        let appended = self.buffer.push(byte);
        debug_assert!(appended);
        self.last_byte_ms = now_ms;
        dropped
    }

    /// Route one byte heard on the wire: echo of our own frame, or traffic.
    ///
    /// Echo is only expected once the transmitter has actually written its
    /// frame; while a frame is still `transmit_pending`, every byte belongs to
    /// another module.
    pub fn accept(&mut self, byte: u8, now_ms: u32, transmit_pending: bool) -> ByteOutcome {
        if self.echo_remaining > 0 && !transmit_pending {
            self.echo_remaining -= 1;
            self.last_byte_ms = now_ms;
            self.echo_since_ms = now_ms;
            self.stats.echo_bytes_suppressed = self.stats.echo_bytes_suppressed.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::trace!("Echo byte {=u8:#04x} suppressed", byte);
            return ByteOutcome::EchoSuppressed;
        }
        self.ingest(byte, now_ms);
        ByteOutcome::Buffered
    }

    /// Read at most one byte from `port` and route it through [`accept`](Self::accept).
    ///
    /// Returns `Ok(None)` when no byte was available.
    pub fn poll<P: SerialPort>(
        &mut self,
        port: &mut P,
        now_ms: u32,
        transmit_pending: bool,
    ) -> Result<Option<ByteOutcome>, P::Error> {
        if !port.bytes_available() {
            return Ok(None);
        }
        let byte = port.read_byte()?;
        Ok(Some(self.accept(byte, now_ms, transmit_pending)))
    }

    //==================================================================================Validation
    /// More than four bytes buffered, exactly `length + 2` of them.
    pub fn has_complete_frame(&self) -> bool {
        is_complete(self.buffer.as_slice())
    }

    /// Whether the buffered frame is complete and ends with its XOR checksum.
    pub fn checksum_valid(&self) -> bool {
        self.has_complete_frame() && frame_checksum_matches(self.buffer.as_slice())
    }

    /// Classify the buffer, dropping it when a complete frame fails its checksum.
    pub fn check_frame(&mut self) -> FrameCheck {
        if !self.has_complete_frame() {
            return FrameCheck::Incomplete;
        }
        if self.checksum_valid() {
            return FrameCheck::Ready;
        }
        self.discard(DiscardReason::ChecksumMismatch);
        FrameCheck::Discarded(DiscardReason::ChecksumMismatch)
    }

    /// Extract the buffered frame if it is complete and valid, then reset.
    ///
    /// A complete frame with a bad checksum is dropped and yields `None`, just
    /// like an incomplete one; [`check_frame`](Self::check_frame) and
    /// [`last_discard`](Self::last_discard) tell the two apart.
    pub fn take_message(&mut self) -> Option<Message> {
        if self.check_frame() != FrameCheck::Ready {
            return None;
        }
        let message = Message::from_frame(self.buffer.as_slice());
        self.buffer.clear();
        self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
        #[cfg(feature = "defmt")]
        if let Some(message) = &message {
            defmt::debug!("Frame received: {}", message);
        }
        message
    }

    /// Drop buffered bytes and echo expectations without recording a discard.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.echo_remaining = 0;
    }

    fn discard(&mut self, reason: DiscardReason) {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "Dropping {} buffered bytes: {}",
            self.buffer.len(),
            reason
        );
        let counter = match reason {
            DiscardReason::Overflow => &mut self.stats.overflows,
            DiscardReason::Timeout => &mut self.stats.timeouts,
            DiscardReason::ChecksumMismatch => &mut self.stats.checksum_errors,
        };
        *counter = counter.wrapping_add(1);
        self.buffer.clear();
        self.last_discard = Some(reason);
    }
}
