//! Link supervisor built on top of [`IbusDriver`].
//!
//! It keeps the poll loop alive and optionally offers:
//!
//! * a transmission handle (`LinkHandle`) to queue outgoing frames;
//! * a message receiver (`LinkMessages`) to pull validated frames.
//!
//! Firmware decides which features it needs by providing pre-allocated
//! [`embassy_sync::channel::Channel`] instances. No allocation is performed by
//! the library and there is no dependency on a particular BSP.
//!
//! The driver itself holds a single outgoing frame. The runner takes the next
//! queued frame only once the previous one has reached the wire and its echo
//! has come back, so frames sent through a [`LinkHandle`] are never
//! overwritten and never delivered back to the application.

use core::fmt::Debug;

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use futures_util::{future::select, future::Either, pin_mut};

use crate::error::{LinkHandleError, LinkRunError};
use crate::protocol::link::driver::IbusDriver;
use crate::protocol::message::Message;
use crate::protocol::transport::traits::{
    clock::LinkClock, link_timer::LinkTimer, serial_port::SerialPort,
};
use crate::protocol::transport::transmitter::BusTransmitter;
use crate::protocol::transport::MAX_PAYLOAD_LEN;

/// Default pause between two poll steps (ms). One byte lasts about 1.15 ms on
/// the wire, so a 1 ms cadence never lets input pile up.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1;

/// Channel type carrying outgoing frames to the runner.
pub type CommandChannel<const CAP: usize> = Channel<CriticalSectionRawMutex, OutgoingFrame, CAP>;
/// Channel type carrying validated messages out of the runner.
pub type MessageChannel<const CAP: usize> = Channel<CriticalSectionRawMutex, Message, CAP>;

/// Service assembling the supervisor components.
pub struct LinkService<'a, P, C, T, const CMD_CAP: usize, const MSG_CAP: usize, const TX: usize>
where
    P: SerialPort,
    C: LinkClock,
    T: LinkTimer,
{
    driver: IbusDriver<P, C, TX>,
    timer: T,
    poll_interval_ms: u32,
    command_channel: Option<&'a CommandChannel<CMD_CAP>>,
    message_channel: Option<&'a MessageChannel<MSG_CAP>>,
}

impl<'a, P, C, T, const CMD_CAP: usize, const MSG_CAP: usize, const TX: usize>
    LinkService<'a, P, C, T, CMD_CAP, MSG_CAP, TX>
where
    P: SerialPort,
    C: LinkClock,
    T: LinkTimer,
{
    /// Wrap an already-initialised [`IbusDriver`].
    pub fn new(
        driver: IbusDriver<P, C, TX>,
        timer: T,
        command_channel: Option<&'a CommandChannel<CMD_CAP>>,
        message_channel: Option<&'a MessageChannel<MSG_CAP>>,
    ) -> Self {
        Self {
            driver,
            timer,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            command_channel,
            message_channel,
        }
    }

    /// Override the pause between two poll steps.
    pub fn with_poll_interval(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Split into handle/receiver/runner components.
    pub fn into_parts(self) -> LinkServiceParts<'a, P, C, T, CMD_CAP, MSG_CAP, TX> {
        let handle = self.command_channel.map(|channel| LinkHandle {
            sender: channel.sender(),
        });
        let messages = self.message_channel.map(|channel| LinkMessages {
            receiver: channel.receiver(),
        });
        LinkServiceParts {
            handle,
            messages,
            runner: LinkRunner {
                driver: self.driver,
                timer: self.timer,
                poll_interval_ms: self.poll_interval_ms,
                command_channel: self.command_channel,
                message_channel: self.message_channel,
            },
        }
    }
}

/// Bundle returned by [`LinkService::into_parts`].
pub struct LinkServiceParts<'a, P, C, T, const CMD_CAP: usize, const MSG_CAP: usize, const TX: usize>
where
    P: SerialPort,
    C: LinkClock,
    T: LinkTimer,
{
    pub handle: Option<LinkHandle<'a, CMD_CAP, TX>>,
    pub messages: Option<LinkMessages<'a, MSG_CAP>>,
    pub runner: LinkRunner<'a, P, C, T, CMD_CAP, MSG_CAP, TX>,
}

/// Runner that drives the poll loop.
pub struct LinkRunner<'a, P, C, T, const CMD_CAP: usize, const MSG_CAP: usize, const TX: usize>
where
    P: SerialPort,
    C: LinkClock,
    T: LinkTimer,
{
    driver: IbusDriver<P, C, TX>,
    timer: T,
    poll_interval_ms: u32,
    command_channel: Option<&'a CommandChannel<CMD_CAP>>,
    message_channel: Option<&'a MessageChannel<MSG_CAP>>,
}

impl<'a, P, C, T, const CMD_CAP: usize, const MSG_CAP: usize, const TX: usize>
    LinkRunner<'a, P, C, T, CMD_CAP, MSG_CAP, TX>
where
    P: SerialPort,
    P::Error: Debug,
    C: LinkClock,
    T: LinkTimer,
{
    /// Poll forever. Only returns on a serial port error or an unstageable command.
    pub async fn drive(mut self) -> Result<(), LinkRunError<P::Error>> {
        let message_channel = self.message_channel;
        let command_channel = self.command_channel;
        let mut held: Option<OutgoingFrame> = None;

        loop {
            if let Some(message) = self.driver.poll().map_err(LinkRunError::Transport)? {
                match message_channel {
                    Some(message_ch) => message_ch.send(message).await,
                    None => {
                        #[cfg(feature = "defmt")]
                        defmt::trace!("No message channel, dropping {}", message);
                    }
                }
            }

            if self.driver.ready_to_stage() {
                if let Some(frame) = held.take() {
                    self.driver
                        .try_stage(frame.source, frame.destination, frame.payload())?;
                }
            }

            match command_channel {
                // Wait for the next tick, or wake early when a frame is queued.
                Some(cmd_ch) if held.is_none() => {
                    let delay = self.timer.delay_ms(self.poll_interval_ms);
                    let command = cmd_ch.receive();
                    pin_mut!(delay);
                    pin_mut!(command);

                    if let Either::Right((frame, _pending_delay)) = select(delay, command).await {
                        #[cfg(feature = "defmt")]
                        defmt::debug!(
                            "Queued frame {=u8:#04x} -> {=u8:#04x}",
                            frame.source,
                            frame.destination
                        );
                        held = Some(frame);
                    }
                }
                _ => self.timer.delay_ms(self.poll_interval_ms).await,
            }
        }
    }
}

/// Transmission handle (optional).
pub struct LinkHandle<'a, const CMD_CAP: usize, const TX: usize> {
    sender: Sender<'a, CriticalSectionRawMutex, OutgoingFrame, CMD_CAP>,
}

impl<'a, const CMD_CAP: usize, const TX: usize> LinkHandle<'a, CMD_CAP, TX> {
    /// Queue a frame; waits while the command channel is full.
    ///
    /// The payload is checked against the driver's transmit buffer here, so a
    /// bad frame is refused to the caller instead of stopping the runner.
    pub async fn send(
        &self,
        source: u8,
        destination: u8,
        payload: &[u8],
    ) -> Result<(), LinkHandleError> {
        let frame = OutgoingFrame::new::<TX>(source, destination, payload)?;
        self.sender.send(frame).await;
        Ok(())
    }

    /// Queue a frame without waiting. Returns the frame back when the channel is full.
    pub fn try_send(
        &self,
        source: u8,
        destination: u8,
        payload: &[u8],
    ) -> Result<Result<(), OutgoingFrame>, LinkHandleError> {
        let frame = OutgoingFrame::new::<TX>(source, destination, payload)?;
        Ok(self.sender.try_send(frame).map_err(|err| match err {
            embassy_sync::channel::TrySendError::Full(frame) => frame,
        }))
    }
}

/// Optional receiver returning validated messages.
pub struct LinkMessages<'a, const MSG_CAP: usize> {
    receiver: Receiver<'a, CriticalSectionRawMutex, Message, MSG_CAP>,
}

impl<'a, const MSG_CAP: usize> LinkMessages<'a, MSG_CAP> {
    pub async fn recv(&mut self) -> Message {
        self.receiver.receive().await
    }

    /// Next message if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_receive().ok()
    }
}

/// Frame queued by producer tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingFrame {
    pub source: u8,
    pub destination: u8,
    len: usize,
    payload: [u8; MAX_PAYLOAD_LEN],
}

impl OutgoingFrame {
    fn new<const TX: usize>(
        source: u8,
        destination: u8,
        payload: &[u8],
    ) -> Result<Self, LinkHandleError> {
        if payload.is_empty() || payload.len() > BusTransmitter::<TX>::max_payload_len() {
            return Err(LinkHandleError::InvalidPayloadLength { len: payload.len() });
        }
        let mut buffer = [0u8; MAX_PAYLOAD_LEN];
        buffer[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            source,
            destination,
            len: payload.len(),
            payload: buffer,
        })
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }
}
