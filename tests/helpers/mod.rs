/// Test doubles to simulate the serial wire, clock, and timer during integration tests.
use ibus_link::protocol::transport::traits::{
    clock::LinkClock, link_timer::LinkTimer, serial_port::SerialPort,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Wire {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    echo: bool,
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// In-memory serial port. Clones share the same wire so a test can inject
/// bytes and inspect writes while the driver owns its own handle.
pub struct FakeSerialPort {
    wire: Arc<Mutex<Wire>>,
}

#[allow(dead_code)]
impl FakeSerialPort {
    /// Port that does not hear its own writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Port on a single-wire bus: every written byte comes back as input.
    pub fn with_echo() -> Self {
        let port = Self::default();
        port.wire.lock().unwrap().echo = true;
        port
    }

    /// Queue bytes as if another module had sent them.
    pub fn inject(&self, bytes: &[u8]) {
        self.wire.lock().unwrap().inbound.extend(bytes.iter().copied());
    }

    /// Everything written so far.
    pub fn written(&self) -> Vec<u8> {
        self.wire.lock().unwrap().written.clone()
    }

    /// Bytes still waiting to be read.
    pub fn pending_input(&self) -> usize {
        self.wire.lock().unwrap().inbound.len()
    }
}

impl SerialPort for FakeSerialPort {
    type Error = ();

    fn bytes_available(&mut self) -> bool {
        !self.wire.lock().unwrap().inbound.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.wire.lock().unwrap().inbound.pop_front().ok_or(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut wire = self.wire.lock().unwrap();
        wire.written.extend_from_slice(bytes);
        if wire.echo {
            wire.inbound.extend(bytes.iter().copied());
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Manually advanced millisecond clock.
pub struct FakeClock {
    now: Arc<AtomicU32>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(ms: u32) -> Self {
        let clock = Self::default();
        clock.now.store(ms, Ordering::SeqCst);
        clock
    }

    pub fn advance(&self, ms: u32) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl LinkClock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
/// Timer that advances a [`FakeClock`] instead of sleeping, then yields to tokio.
pub struct FakeTimer {
    pub clock: FakeClock,
}

impl LinkTimer for FakeTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.clock.advance(millis);
        tokio::task::yield_now().await;
    }
}

#[allow(dead_code)]
/// Build a valid frame (checksum appended) for injection.
pub fn frame(source: u8, destination: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![source, (payload.len() + 2) as u8, destination];
    bytes.extend_from_slice(payload);
    let checksum = bytes.iter().fold(0u8, |acc, byte| acc ^ byte);
    bytes.push(checksum);
    bytes
}
