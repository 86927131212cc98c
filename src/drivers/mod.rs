//! GPIO controller, its blink worker, and thread helpers.

pub mod blink;
pub mod gpio_controller;
pub mod worker;
