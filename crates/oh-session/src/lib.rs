//! Session lifecycle management for the oxidized-horizon emulator
//!
//! This crate owns the native core handle and enforces the session
//! state machine: initialize, load with rollback, firmware operations,
//! and ordered close.

pub mod session;

pub use session::Session;
