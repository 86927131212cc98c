//! In-memory GPIO driver for hosts without real pins.
//!
//! Every transition is logged with a `gpio(sim)` prefix so a desktop run
//! shows what the LED would be doing. Clones share one pin table, which lets
//! tests keep a handle after boxing the driver into the controller.

use std::collections::BTreeMap;
use std::sync::Arc;

use embedded_hal::digital::PinState;
use log::info;
use parking_lot::Mutex;

use crate::app::ports::{GpioPort, PinDirection, Pull};
use crate::config::PinNumbering;
use crate::error::HardwareError;

#[derive(Debug, Clone, Copy)]
struct SimPin {
    direction: PinDirection,
    level: PinState,
}

#[derive(Debug, Default)]
struct SimBoard {
    mode: Option<PinNumbering>,
    pins: BTreeMap<u8, SimPin>,
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedGpio {
    board: Arc<Mutex<SimBoard>>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of a claimed pin.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.board.lock().pins.get(&pin).map(|p| p.level)
    }

    pub fn claimed_pins(&self) -> usize {
        self.board.lock().pins.len()
    }
}

impl GpioPort for SimulatedGpio {
    fn set_mode(&mut self, scheme: PinNumbering) -> Result<(), HardwareError> {
        info!("gpio(sim): numbering {:?}", scheme);
        self.board.lock().mode = Some(scheme);
        Ok(())
    }

    fn configure_pin(
        &mut self,
        pin: u8,
        direction: PinDirection,
        pull: Pull,
    ) -> Result<(), HardwareError> {
        // An idle pull-up input reads high (button released).
        let level = match (direction, pull) {
            (PinDirection::Input, Pull::Up) => PinState::High,
            _ => PinState::Low,
        };
        info!("gpio(sim): pin {} as {:?} ({:?})", pin, direction, pull);
        self.board.lock().pins.insert(pin, SimPin { direction, level });
        Ok(())
    }

    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError> {
        let mut board = self.board.lock();
        let slot = board
            .pins
            .get_mut(&pin)
            .filter(|p| p.direction == PinDirection::Output)
            .ok_or(HardwareError::PinNotClaimed(pin))?;
        slot.level = level;
        info!(
            "gpio(sim): pin {} -> {}",
            pin,
            if level == PinState::High { "HIGH" } else { "LOW" }
        );
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError> {
        self.board
            .lock()
            .pins
            .get(&pin)
            .map(|p| p.level)
            .ok_or(HardwareError::PinNotClaimed(pin))
    }

    fn release_all(&mut self) -> Result<(), HardwareError> {
        let mut board = self.board.lock();
        info!("gpio(sim): releasing {} pin(s)", board.pins.len());
        board.pins.clear();
        board.mode = None;
        Ok(())
    }

    fn is_hardware(&self) -> bool {
        false
    }
}
