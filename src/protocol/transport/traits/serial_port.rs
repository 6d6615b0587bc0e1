//! Minimal abstraction for a half-duplex serial line. Allows the library to
//! plug into various implementations (embedded HAL UART, desktop driver, test
//! double, etc.). Bit rate and parity are configured by the implementation.

/// Non-blocking byte channel over the shared bus wire.
///
/// Every byte written is heard back on the same wire; the driver accounts for
/// that echo itself, implementations must not filter it.
pub trait SerialPort {
    type Error: core::fmt::Debug;

    /// Whether at least one received byte is waiting to be read.
    fn bytes_available(&mut self) -> bool;

    /// Read one received byte. Only called after [`bytes_available`](Self::bytes_available)
    /// returned `true`.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Write every byte of `bytes` back-to-back.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    type Error = P::Error;

    fn bytes_available(&mut self) -> bool {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(bytes)
    }
}

