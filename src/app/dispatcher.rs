//! Maps validated actions onto controller operations.
//!
//! The dispatcher never sees a raw string unless it came through
//! [`execute_named`](ActionDispatcher::execute_named), which gates it on
//! the [`ActionRegistry`] first.

use std::sync::Arc;

use log::{info, warn};

use crate::config::BlinkConfig;
use crate::drivers::gpio_controller::GpioController;
use crate::error::Error;

use super::actions::{ActionId, ActionRegistry};
use super::ports::ClockPort;
use super::result::ActionResult;

pub struct ActionDispatcher {
    controller: Arc<GpioController>,
    registry: ActionRegistry,
    clock: Box<dyn ClockPort>,
    blink: BlinkConfig,
}

impl ActionDispatcher {
    pub fn new(
        controller: Arc<GpioController>,
        registry: ActionRegistry,
        clock: Box<dyn ClockPort>,
        blink: BlinkConfig,
    ) -> Self {
        Self {
            controller,
            registry,
            clock,
            blink,
        }
    }

    pub fn controller(&self) -> &Arc<GpioController> {
        &self.controller
    }

    /// Run one action to completion (blink returns once the worker starts).
    pub fn execute(&self, action: ActionId) -> ActionResult {
        info!("dispatch: {}", action);
        match action {
            ActionId::PrintTime => self.print_time(),
            ActionId::ToggleLed => self.controller.toggle_led(None),
            ActionId::BlinkLed => self
                .controller
                .blink_led(self.blink.duration(), self.blink.period()),
            ActionId::StopBlink => self.controller.stop_blink(),
            ActionId::GetStatus => self.controller.get_status(),
        }
    }

    /// Gated entry for callers holding a string. Unknown names never reach
    /// the controller.
    pub fn execute_named(&self, name: &str) -> ActionResult {
        match self.registry.lookup(name) {
            Some(action) => self.execute(action),
            None => {
                warn!("dispatch: rejected unknown action '{}'", name);
                Error::UnknownAction(name.to_string()).into()
            }
        }
    }

    fn print_time(&self) -> ActionResult {
        let now = self.clock.now();
        let time = now.format("%H:%M:%S").to_string();
        ActionResult::ok()
            .with_message(format!("The current time is {}", time))
            .with("time", time)
            .with("date", now.format("%Y-%m-%d").to_string())
            .with("timestamp", now.to_rfc3339())
    }
}
