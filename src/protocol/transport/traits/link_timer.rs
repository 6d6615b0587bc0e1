//! Asynchronous timer abstraction pacing the supervisor poll loop.

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait LinkTimer {
    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}

/// [`LinkTimer`] backed by `embassy_time::Timer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyTimer;

impl LinkTimer for EmbassyTimer {
    async fn delay_ms(&mut self, millis: u32) {
        embassy_time::Timer::after_millis(millis as u64).await;
    }
}
