//! SessionKeeper — keeps cloud notebook sessions alive.
//!
//! Detects disconnect/timeout dialogs in matched notebook pages, clicks
//! through them, optionally auto-runs the first cell, and notifies the user
//! of connection transitions. The platform (tabs, notifications, timers,
//! idle, the page DOM) is consumed through the capability traits in
//! [`platform`]; this library crate exposes all modules for use by the
//! binary and integration tests.

pub mod app;
pub mod managers;
pub mod platform;
pub mod runtime;
pub mod services;
pub mod types;
