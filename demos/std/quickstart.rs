//! # Quickstart Example
//!
//! Minimal example demonstrating the basics of ibus-link:
//! - Stage a frame and watch it wait for an idle bus
//! - Feed captured bytes through the driver and read the message
//! - Observe echo suppression and discard reasons
//!
//! This example uses `std` and an in-memory wire for a quick trial run.
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use ibus_link::protocol::link::driver::IbusDriver;
use ibus_link::protocol::lookups::ModuleId;
use ibus_link::protocol::transport::traits::{clock::LinkClock, serial_port::SerialPort};
use std::cell::Cell;
use std::collections::VecDeque;

/// Single-wire loopback: every written byte is heard back.
#[derive(Default)]
struct LoopbackWire {
    inbound: VecDeque<u8>,
}

impl SerialPort for LoopbackWire {
    type Error = ();

    fn bytes_available(&mut self) -> bool {
        !self.inbound.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        self.inbound.pop_front().ok_or(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        print!("   wire <- ");
        for byte in bytes {
            print!("{:02X} ", byte);
        }
        println!();
        self.inbound.extend(bytes.iter().copied());
        Ok(())
    }
}

struct SimClock(Cell<u32>);

impl LinkClock for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

fn main() -> Result<(), ()> {
    println!("=== ibus-link Quickstart ===\n");

    let clock = SimClock(Cell::new(0));
    let mut driver = IbusDriver::new(LoopbackWire::default(), &clock);

    // ======================================================================
    // 1. Receive a captured instrument cluster broadcast
    // ======================================================================
    println!("1. Receiving 80 05 BF 18 00 00 22");
    driver
        .port_mut()
        .inbound
        .extend([0x80, 0x05, 0xBF, 0x18, 0x00, 0x00, 0x22]);

    for _ in 0..10 {
        clock.0.set(clock.0.get() + 1);
        if let Some(message) = driver.poll()? {
            let source = ModuleId::try_from(message.source())
                .map(|module| module.mnemonic())
                .unwrap_or("?");
            println!(
                "   {} -> {:02X}, payload {:02X?}\n",
                source,
                message.destination(),
                message.payload()
            );
        }
    }

    // ======================================================================
    // 2. Transmit: the frame waits for 32 ms of silence, then its echo is dropped
    // ======================================================================
    println!("2. Staging TEL -> IKE [01]");
    driver
        .stage(ModuleId::Tel.into(), ModuleId::Ike.into(), &[0x01])
        .map_err(|err| eprintln!("   stage failed: {}", err))?;

    for _ in 0..60 {
        clock.0.set(clock.0.get() + 1);
        if driver.poll()?.is_some() {
            println!("   unexpected message: echo leaked");
        }
    }
    println!(
        "   echo bytes suppressed: {}\n",
        driver.stats().echo_bytes_suppressed
    );

    // ======================================================================
    // 3. Corrupted frame
    // ======================================================================
    println!("3. Receiving a frame with a bad checksum");
    driver
        .port_mut()
        .inbound
        .extend([0x80, 0x05, 0xBF, 0x18, 0x00, 0x00, 0x23]);
    for _ in 0..10 {
        clock.0.set(clock.0.get() + 1);
        driver.poll()?;
    }
    println!("   last discard: {:?}", driver.last_discard());

    Ok(())
}
