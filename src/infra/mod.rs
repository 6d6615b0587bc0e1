//! Low-level building blocks reused by both directions of the link.
pub mod checksum;
