//! Error definitions shared across library modules.
//! Receive-side problems never surface as errors: the receiver resynchronizes
//! on its own and reports what it dropped through [`DiscardReason`]. Errors are
//! reserved for caller mistakes (staging) and transport failures.
use thiserror_no_std::Error;

//==================================================================================DISCARD
/// Why the receiver dropped the bytes it had accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscardReason {
    /// More than 254 bytes accumulated without a valid frame boundary.
    Overflow,
    /// The wire stayed silent for too long in the middle of a frame.
    Timeout,
    /// A complete frame arrived but its trailing byte did not match the XOR checksum.
    ChecksumMismatch,
}

//==================================================================================STAGE_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors raised while staging an outgoing frame.
pub enum StageError {
    /// A frame needs at least one payload byte.
    #[error("Payload is empty: unable to build")]
    EmptyPayload,
    /// The encoded frame does not fit the transmit buffer.
    #[error("Frame too large: {len} bytes, capacity {capacity}")]
    FrameTooLarge { len: usize, capacity: usize },
    /// A raw frame declares a length byte that disagrees with the bytes supplied.
    #[error("Declared length {declared} does not match {actual} supplied bytes")]
    LengthMismatch { declared: u8, actual: usize },
    /// A previous frame is still waiting for the bus to go idle.
    #[error("Transmitter busy: a frame is already pending")]
    Busy,
}

//==================================================================================LINK_ERRORS
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors returned by [`LinkHandle`](crate::protocol::link::supervisor::LinkHandle)
/// before a command is queued.
pub enum LinkHandleError {
    /// Payload is empty or exceeds what a single frame can carry.
    #[error("Invalid payload length: {len}")]
    InvalidPayloadLength { len: usize },
}

#[derive(Error, Debug)]
/// Errors that stop the supervisor loop.
pub enum LinkRunError<E: core::fmt::Debug> {
    /// The serial port failed while reading or writing.
    #[error("Serial transport error: {0:?}")]
    Transport(E),
    /// A queued command could not be staged.
    #[error(transparent)]
    Stage(#[from] StageError),
}
