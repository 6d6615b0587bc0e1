//! Abstraction traits used by the transport layer (serial port, clock, and timer).
pub mod clock;
pub mod link_timer;
pub mod serial_port;
