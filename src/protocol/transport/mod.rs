//! I-Bus transport layer: byte-level frame assembly, staged transmission with
//! bus-idle arbitration, and the port/clock abstraction traits.
//!
//! ## I-Bus Timing Constants
//!
//! The bus runs at 9600 baud, 8 data bits, even parity, one stop bit: one byte
//! occupies the wire for roughly 1.15 ms. The constants below are expressed in
//! milliseconds of the injected [`LinkClock`](traits::clock::LinkClock).

pub mod receiver;
pub mod traits;
pub mod transmitter;

/// Bit rate of the bus. Informational: the serial port is configured outside
/// this crate.
pub const IBUS_BAUD_RATE: u32 = 9600;

/// Maximum silence tolerated between two bytes of the same frame (ms).
///
/// Back-to-back bytes arrive about 1 ms apart. A gap of this size means the
/// sender stopped mid-frame or a byte was lost, so the partial frame is dropped
/// and the receiver resynchronizes on the next byte.
pub const RX_INTER_BYTE_TIMEOUT_MS: u32 = 8;

/// Bus silence required before a staged frame is written (ms).
///
/// There is no explicit arbitration phase on the wire. Thirty-two milliseconds
/// without a received byte is taken as evidence that no other module is
/// transmitting. The transceiver's dominant-bit behavior resolves the rare
/// remaining collisions.
pub const BUS_IDLE_BEFORE_TX_MS: u32 = 32;

/// Receive buffer capacity (bytes).
pub const MAX_RX_FRAME_LEN: usize = 255;

/// Once this many bytes are buffered without a frame boundary, the buffer is
/// cleared before the next byte is appended.
pub const RX_OVERFLOW_THRESHOLD: usize = 254;

/// Default transmit buffer capacity (bytes), enough for a 12-byte payload.
pub const DEFAULT_TX_FRAME_LEN: usize = 16;

/// Source and length bytes, which the length byte does not count.
pub const FRAME_OVERHEAD: usize = 2;

/// Source, length, destination, one payload byte, checksum.
pub const MIN_FRAME_LEN: usize = 5;

/// Largest payload a frame can carry while fitting the receive buffer.
pub const MAX_PAYLOAD_LEN: usize = MAX_RX_FRAME_LEN - 4;
