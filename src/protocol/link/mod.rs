//! Link layer: the synchronous poll-driven driver and an optional async
//! supervisor that runs it in the background.
pub mod driver;
pub mod supervisor;
