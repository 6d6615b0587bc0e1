//! High-level components of the I-Bus protocol: lookup tables, the validated
//! message view, the byte-level transport, and the poll-driven link.
pub mod link;
pub mod lookups;
pub mod message;
pub mod transport;
