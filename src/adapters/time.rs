//! Wall-clock adapter.
//!
//! Implements [`ClockPort`] with the local system time via `chrono`. On a
//! Pi without RTC this is whatever NTP last set.

use chrono::{DateTime, Local};

use crate::app::ports::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
