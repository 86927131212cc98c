//! Application core — everything between raw model text and the pins.
//!
//! Parsing, action gating and dispatch live here. All interaction with
//! hardware, the model, the clock and the console happens through **port
//! traits** defined in [`ports`], keeping this layer testable without a
//! Raspberry Pi.

pub mod actions;
pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod parser;
pub mod ports;
pub mod prompt;
pub mod result;
pub mod service;
