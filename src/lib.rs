//! `ibus-link` library: framing and bus arbitration for the BMW I-Bus, a
//! single-wire, half-duplex serial bus shared by the car's electronic modules,
//! in a `no_std` environment. The crate exposes the infrastructure modules
//! (bounded buffers, checksum), the transport layer (receiver, transmitter,
//! port and clock traits), and the link layer (driver and async supervisor).
#![no_std]
//==================================================================================
/// Bounded byte storage shared by the receive and transmit paths.
pub mod core;
/// Receive discard reasons, staging errors, and supervisor errors.
pub mod error;
/// Checksum routine shared by both directions of the link.
pub mod infra;
/// I-Bus protocol implementation: transport, message view, driver, lookups.
pub mod protocol;
//==================================================================================
