//! PiLamp library.
//!
//! Natural-language GPIO assistant for the Raspberry Pi Zero 2W: model text
//! goes in, a validated action comes out and drives one LED. Exposed as a
//! library so the integration tests can drive every layer with mock ports.
//! Real GPIO is compiled in with the `rpi` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;

pub use error::{Error, HardwareError, Result};
