//! I-Bus frame stager: builds one checksummed frame and writes it to the port
//! once the bus has been quiet long enough.
//!
//! The transmitter holds a single frame. [`BusTransmitter::stage`] replaces
//! whatever is still pending; callers that must not lose a frame check
//! [`BusTransmitter::is_pending`] first or use [`BusTransmitter::try_stage`].
use crate::core::FrameBytes;
use crate::error::StageError;
use crate::infra::checksum::xor_checksum;
use crate::protocol::transport::traits::clock::elapsed_ms;
use crate::protocol::transport::traits::serial_port::SerialPort;
use crate::protocol::transport::{
    BUS_IDLE_BEFORE_TX_MS, DEFAULT_TX_FRAME_LEN, FRAME_OVERHEAD, MAX_RX_FRAME_LEN,
};

/// Transmit side of the link, holding at most one frame of up to `N` bytes.
#[derive(Debug, Clone)]
pub struct BusTransmitter<const N: usize = DEFAULT_TX_FRAME_LEN> {
    buffer: FrameBytes<N>,
    pending: bool,
    frames_sent: u32,
}

impl<const N: usize> Default for BusTransmitter<N> {
    fn default() -> Self {
        Self::with_capacity()
    }
}

impl BusTransmitter<DEFAULT_TX_FRAME_LEN> {
    /// Transmitter with the default 16-byte buffer.
    pub const fn new() -> Self {
        Self::with_capacity()
    }
}

impl<const N: usize> BusTransmitter<N> {
    /// Transmitter with an `N`-byte buffer.
    pub const fn with_capacity() -> Self {
        Self {
            buffer: FrameBytes::new(),
            pending: false,
            frames_sent: 0,
        }
    }

    /// Whether a staged frame is waiting for the bus.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Bytes of the last staged frame, checksum included.
    #[inline]
    pub fn staged(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Number of frames written to the port so far.
    #[inline]
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// Largest payload this transmitter can stage.
    pub const fn max_payload_len() -> usize {
        let capacity = if N < MAX_RX_FRAME_LEN {
            N
        } else {
            MAX_RX_FRAME_LEN
        };
        capacity.saturating_sub(4)
    }

    //==================================================================================Staging
    /// Build `[source][length][destination][payload][checksum]` and mark it pending.
    ///
    /// Any frame still pending is overwritten.
    pub fn stage(&mut self, source: u8, destination: u8, payload: &[u8]) -> Result<(), StageError> {
        if payload.is_empty() {
            return Err(StageError::EmptyPayload);
        }
        let total = payload.len() + 4;
        let capacity = Self::max_payload_len() + 4;
        if total > capacity {
            return Err(StageError::FrameTooLarge {
                len: total,
                capacity,
            });
        }

        #[cfg(feature = "defmt")]
        if self.pending {
            defmt::warn!("Overwriting a frame that never reached the bus");
        }

        let length = (total - FRAME_OVERHEAD) as u8;
        self.buffer.clear();
        for byte in [source, length, destination] {
            self.buffer.push(byte);
        }
        for &byte in payload {
            self.buffer.push(byte);
        }
        let checksum = xor_checksum(self.buffer.as_slice());
        self.buffer.push(checksum);
        self.pending = true;
        Ok(())
    }

    /// Like [`stage`](Self::stage), but refuses to replace a pending frame.
    pub fn try_stage(
        &mut self,
        source: u8,
        destination: u8,
        payload: &[u8],
    ) -> Result<(), StageError> {
        if self.pending {
            return Err(StageError::Busy);
        }
        self.stage(source, destination, payload)
    }

    /// Stage a pre-built `[source][length][destination][payload…]` sequence.
    ///
    /// The checksum is computed here and must not be included. The length byte
    /// has to agree with the number of bytes supplied.
    pub fn stage_raw(&mut self, frame: &[u8]) -> Result<(), StageError> {
        let declared = frame.get(1).copied().unwrap_or(0);
        // Without its checksum the frame is one byte shorter than `length + 2`.
        if frame.len() < 3 || frame.len() != declared as usize + FRAME_OVERHEAD - 1 {
            return Err(StageError::LengthMismatch {
                declared,
                actual: frame.len(),
            });
        }
        self.stage(frame[0], frame[2], &frame[3..])
    }

    //==================================================================================Flush
    /// Write the staged frame if the bus has been silent since `last_inbound_ms`
    /// for at least 32 ms.
    ///
    /// Returns the number of bytes written, which is also the number of echo
    /// bytes the receiver has to swallow. A port error leaves the frame pending
    /// for the next attempt.
    pub fn try_flush<P: SerialPort>(
        &mut self,
        port: &mut P,
        now_ms: u32,
        last_inbound_ms: u32,
    ) -> Result<Option<usize>, P::Error> {
        if !self.pending || elapsed_ms(now_ms, last_inbound_ms) < BUS_IDLE_BEFORE_TX_MS {
            return Ok(None);
        }

        port.write_all(self.buffer.as_slice())?;
        self.pending = false;
        self.frames_sent = self.frames_sent.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::debug!("Frame sent: {=[u8]:x}", self.buffer.as_slice());

        Ok(Some(self.buffer.len()))
    }
}
