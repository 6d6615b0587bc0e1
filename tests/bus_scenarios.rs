//! End-to-end scenarios through the public driver API: valid and corrupted
//! frames, overflow recovery, arbitration timing, and echo handling on a
//! shared wire.

mod helpers;

use helpers::{frame, FakeClock, FakeSerialPort};
use ibus_link::error::DiscardReason;
use ibus_link::protocol::link::driver::IbusDriver;
use ibus_link::protocol::lookups::ModuleId;
use ibus_link::protocol::message::Message;
use ibus_link::protocol::transport::{BUS_IDLE_BEFORE_TX_MS, RX_INTER_BYTE_TIMEOUT_MS};

/// Poll once per simulated millisecond, collecting every delivered message.
fn run(
    driver: &mut IbusDriver<FakeSerialPort, FakeClock>,
    clock: &FakeClock,
    polls: usize,
) -> Vec<Message> {
    let mut messages = Vec::new();
    for _ in 0..polls {
        clock.advance(1);
        if let Some(message) = driver.poll().expect("fake port never fails") {
            messages.push(message);
        }
    }
    messages
}

#[test]
/// Scenario A: instrument cluster broadcast delivered as one burst.
fn scenario_valid_frame() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    port.inject(&[0x80, 0x05, 0xBF, 0x18, 0x00, 0x00, 0x22]);
    let messages = run(&mut driver, &clock, 10);

    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.source(), u8::from(ModuleId::Ike));
    assert_eq!(message.length(), 5);
    assert_eq!(message.destination(), u8::from(ModuleId::All));
    assert_eq!(message.payload(), &[0x18, 0x00, 0x00]);
    assert_eq!(driver.stats().frames_received, 1);
}

#[test]
/// Scenario B: the same burst with a corrupted checksum produces nothing.
fn scenario_corrupted_checksum() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    port.inject(&[0x80, 0x05, 0xBF, 0x18, 0x00, 0x00, 0x23]);
    assert!(run(&mut driver, &clock, 10).is_empty());
    assert_eq!(driver.buffered_len(), 0);
    assert_eq!(driver.last_discard(), Some(DiscardReason::ChecksumMismatch));
    assert_eq!(driver.stats().checksum_errors, 1);

    // The receiver is immediately ready for the next frame.
    port.inject(&[0x80, 0x05, 0xBF, 0x18, 0x00, 0x00, 0x22]);
    assert_eq!(run(&mut driver, &clock, 10).len(), 1);
}

#[test]
/// Scenario C: 255 bytes of noise, then normal operation resumes.
fn scenario_overflow_recovery() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    // A length byte of 0xFF can never be satisfied.
    port.inject(&[0xFF; 255]);
    assert!(run(&mut driver, &clock, 255).is_empty());
    assert_eq!(driver.buffered_len(), 255);

    port.inject(&frame(0x50, 0x68, &[0x32, 0x11]));
    let messages = run(&mut driver, &clock, 10);
    assert_eq!(driver.stats().overflows, 1);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload(), &[0x32, 0x11]);
}

#[test]
/// Two frames back to back are separated by their length bytes alone.
fn back_to_back_frames() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    port.inject(&frame(0x50, 0x68, &[0x3B, 0x01]));
    port.inject(&frame(0x68, 0x80, &[0x23, 0x42, 0x30]));
    let messages = run(&mut driver, &clock, 20);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].source(), 0x50);
    assert_eq!(messages[1].source(), 0x68);
    assert_eq!(messages[1].payload(), &[0x23, 0x42, 0x30]);
}

#[test]
/// A frame whose bytes straddle an 8 ms pause is never assembled.
fn stalled_sender_is_dropped() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());
    let bytes = frame(0xC8, 0x80, &[0x01, 0x02, 0x03]);

    port.inject(&bytes[..4]);
    run(&mut driver, &clock, 4);
    clock.advance(RX_INTER_BYTE_TIMEOUT_MS);
    port.inject(&bytes[4..]);

    assert!(run(&mut driver, &clock, 10).is_empty());
    assert_eq!(driver.stats().timeouts, 1);
}

#[test]
/// The staged frame only goes out after 32 ms without inbound traffic.
fn transmission_waits_for_quiet_bus() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    driver
        .stage(ModuleId::Tel.into(), ModuleId::Ike.into(), &[0x01])
        .expect("payload fits");

    // Traffic keeps arriving every 20 ms: the bus never looks idle.
    for _ in 0..10 {
        port.inject(&frame(0x80, 0xBF, &[0x18, 0x00]));
        run(&mut driver, &clock, 20);
        assert!(port.written().is_empty());
    }

    run(&mut driver, &clock, BUS_IDLE_BEFORE_TX_MS as usize + 1);
    assert_eq!(port.written(), frame(0xC8, 0x80, &[0x01]));
    assert!(!driver.transmit_pending());
}

#[test]
/// On a single wire our own frame comes back; it is swallowed, not delivered.
fn own_transmission_echo_is_swallowed() {
    let port = FakeSerialPort::with_echo();
    let clock = FakeClock::at(1_000);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    driver
        .stage(ModuleId::Rad.into(), ModuleId::Ike.into(), &[0x23, 0x42])
        .expect("payload fits");
    let messages = run(&mut driver, &clock, 40);

    assert!(messages.is_empty());
    assert_eq!(port.written().len(), 6);
    assert_eq!(port.pending_input(), 0);
    assert_eq!(driver.stats().echo_bytes_suppressed, 6);
    assert_eq!(driver.stats().frames_received, 0);
}

#[test]
/// `stage` overwrites an unsent frame while `try_stage` refuses.
fn staging_policy() {
    let port = FakeSerialPort::new();
    let clock = FakeClock::at(0);
    let mut driver = IbusDriver::new(port.clone(), clock.clone());

    driver.stage(0x68, 0x18, &[0x01]).expect("payload fits");
    driver.stage(0x68, 0x18, &[0x02]).expect("payload fits");
    assert!(driver.try_stage(0x68, 0x18, &[0x03]).is_err());

    run(&mut driver, &clock, 40);
    assert_eq!(port.written(), frame(0x68, 0x18, &[0x02]));
}

#[test]
/// Mutating any single non-checksum byte of a valid frame breaks validation.
fn single_byte_corruption_is_always_caught() {
    let valid = frame(0x3F, 0x00, &[0x0C, 0x01, 0x4E, 0x00]);
    for index in 0..valid.len() - 1 {
        for flip in [0x01u8, 0x10, 0x80, 0xFF] {
            let mut corrupted = valid.clone();
            corrupted[index] ^= flip;
            assert!(
                Message::from_frame(&corrupted).is_none(),
                "flip {flip:#04x} at {index} accepted"
            );
        }
    }
}
