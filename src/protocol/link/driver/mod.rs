//! Cooperative I-Bus driver gluing a serial port and a clock to one receiver
//! and one transmitter.
//!
//! The driver never blocks and owns no thread. The embedding application calls
//! [`IbusDriver::poll`] in its main loop, every millisecond or so; timeouts and
//! bus arbitration are only as precise as that cadence.
//!
//! # Example
//!
//! ```rust,ignore
//! use ibus_link::protocol::link::driver::IbusDriver;
//! use ibus_link::protocol::lookups::ModuleId;
//!
//! let mut driver = IbusDriver::new(uart, clock);
//! driver.stage(ModuleId::Tel.into(), ModuleId::Ike.into(), &[0x01])?;
//! loop {
//!     if let Some(message) = driver.poll()? {
//!         handle(message);
//!     }
//! }
//! ```
use crate::error::{DiscardReason, StageError};
use crate::protocol::message::Message;
use crate::protocol::transport::receiver::{BusReceiver, ByteOutcome, ReceiverStats};
use crate::protocol::transport::traits::{clock::LinkClock, serial_port::SerialPort};
use crate::protocol::transport::transmitter::BusTransmitter;
use crate::protocol::transport::DEFAULT_TX_FRAME_LEN;

/// One driver instance per serial port.
pub struct IbusDriver<P: SerialPort, C: LinkClock, const TX: usize = DEFAULT_TX_FRAME_LEN> {
    port: P,
    clock: C,
    receiver: BusReceiver,
    transmitter: BusTransmitter<TX>,
}

impl<P: SerialPort, C: LinkClock> IbusDriver<P, C> {
    /// Driver with the default 16-byte transmit buffer.
    pub fn new(port: P, clock: C) -> Self {
        Self::with_tx_capacity(port, clock)
    }
}

impl<P: SerialPort, C: LinkClock, const TX: usize> IbusDriver<P, C, TX> {
    /// Driver with a `TX`-byte transmit buffer.
    pub fn with_tx_capacity(port: P, clock: C) -> Self {
        Self {
            port,
            clock,
            receiver: BusReceiver::new(),
            transmitter: BusTransmitter::with_capacity(),
        }
    }

    /// Run one cooperative step.
    ///
    /// 1. Drop a stale or overflowing partial frame.
    /// 2. Read at most one byte, swallowing it if it is our own echo.
    /// 3. Write the staged frame if the bus has been idle long enough.
    /// 4. Hand out the buffered frame if the byte just read completed it.
    pub fn poll(&mut self) -> Result<Option<Message>, P::Error> {
        let now = self.clock.now_ms();

        if let Some(_reason) = self.receiver.expire(now) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Partial frame expired between bytes: {}", _reason);
        }
        let outcome = self
            .receiver
            .poll(&mut self.port, now, self.transmitter.is_pending())?;

        if let Some(written) =
            self.transmitter
                .try_flush(&mut self.port, now, self.receiver.last_byte_ms())?
        {
            self.receiver.expect_echo(written, now);
        }

        // A frame only completes on a buffered byte, and is settled in that
        // same step.
        if outcome != Some(ByteOutcome::Buffered) {
            return Ok(None);
        }
        Ok(self.receiver.take_message())
    }

    /// Stage a frame for transmission, replacing any frame still pending.
    ///
    /// Check [`transmit_pending`](Self::transmit_pending) first, or use
    /// [`try_stage`](Self::try_stage), when the previous frame must not be lost.
    pub fn stage(&mut self, source: u8, destination: u8, payload: &[u8]) -> Result<(), StageError> {
        self.transmitter.stage(source, destination, payload)
    }

    /// Stage a frame unless one is already pending.
    pub fn try_stage(
        &mut self,
        source: u8,
        destination: u8,
        payload: &[u8],
    ) -> Result<(), StageError> {
        self.transmitter.try_stage(source, destination, payload)
    }

    /// Stage a pre-built frame without checksum, replacing any frame still pending.
    pub fn stage_raw(&mut self, frame: &[u8]) -> Result<(), StageError> {
        self.transmitter.stage_raw(frame)
    }

    /// Whether a staged frame is still waiting for an idle bus.
    #[inline]
    pub fn transmit_pending(&self) -> bool {
        self.transmitter.is_pending()
    }

    /// No frame is pending and the echo of the last one has been heard back
    /// (or given up on).
    ///
    /// Staging earlier makes the receiver treat the rest of that echo as
    /// foreign traffic, so it would be delivered as a message.
    #[inline]
    pub fn ready_to_stage(&self) -> bool {
        !self.transmitter.is_pending() && self.receiver.echo_remaining() == 0
    }

    /// Number of bytes in the receive buffer.
    #[inline]
    pub fn buffered_len(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    #[inline]
    pub fn last_discard(&self) -> Option<DiscardReason> {
        self.receiver.last_discard()
    }

    pub fn receiver(&self) -> &BusReceiver {
        &self.receiver
    }

    pub fn transmitter(&self) -> &BusTransmitter<TX> {
        &self.transmitter
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Stop the driver and give back the port and clock. Buffered bytes and any
    /// pending frame are dropped.
    pub fn release(self) -> (P, C) {
        (self.port, self.clock)
    }
}
