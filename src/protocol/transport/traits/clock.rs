//! Monotonic millisecond time source. Every timeout of the link (inter-byte
//! silence, bus idle before transmit) is measured by comparing two readings.

/// Monotonic clock with millisecond resolution.
///
/// The value is allowed to wrap around `u32::MAX`; the driver only ever looks
/// at wrapping differences between two readings.
pub trait LinkClock {
    /// Current timestamp in milliseconds.
    fn now_ms(&self) -> u32;
}

impl<C: LinkClock + ?Sized> LinkClock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// [`LinkClock`] backed by the Embassy time driver of the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl LinkClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the intended wrap-around.
        embassy_time::Instant::now().as_millis() as u32
    }
}

/// Milliseconds elapsed between `earlier` and `now`, tolerant to wrap-around.
#[inline]
pub fn elapsed_ms(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}
