//! Raspberry Pi GPIO driver backed by `rppal`.
//!
//! Pins are driven through the `embedded-hal` 1.0 digital traits that
//! rppal implements with its `hal` feature. Dropping an rppal pin resets it
//! to its original mode, so releasing is just forgetting the handles.

use std::collections::BTreeMap;

use embedded_hal::digital::{OutputPin as _, PinState};
use log::info;
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::app::ports::{GpioPort, PinDirection, Pull};
use crate::config::PinNumbering;
use crate::error::HardwareError;

pub struct RppalGpio {
    gpio: Gpio,
    outputs: BTreeMap<u8, OutputPin>,
    inputs: BTreeMap<u8, InputPin>,
}

impl RppalGpio {
    /// Open `/dev/gpiomem`. Fails off a Pi or without permission.
    pub fn open() -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|e| HardwareError::ModeFailed(e.to_string()))?;
        info!("gpio: rppal driver opened");
        Ok(Self {
            gpio,
            outputs: BTreeMap::new(),
            inputs: BTreeMap::new(),
        })
    }
}

impl GpioPort for RppalGpio {
    fn set_mode(&mut self, scheme: PinNumbering) -> Result<(), HardwareError> {
        match scheme {
            PinNumbering::Bcm => Ok(()),
            PinNumbering::Board => Err(HardwareError::ModeFailed(
                "rppal only supports BCM numbering".into(),
            )),
        }
    }

    fn configure_pin(
        &mut self,
        pin: u8,
        direction: PinDirection,
        pull: Pull,
    ) -> Result<(), HardwareError> {
        let raw = self
            .gpio
            .get(pin)
            .map_err(|e| HardwareError::ConfigureFailed {
                pin,
                reason: e.to_string(),
            })?;
        self.outputs.remove(&pin);
        self.inputs.remove(&pin);
        match direction {
            PinDirection::Output => {
                self.outputs.insert(pin, raw.into_output_low());
            }
            PinDirection::Input => {
                let input = match pull {
                    Pull::Up => raw.into_input_pullup(),
                    Pull::Down => raw.into_input_pulldown(),
                    Pull::None => raw.into_input(),
                };
                self.inputs.insert(pin, input);
            }
        }
        info!("gpio: pin {} as {:?} ({:?})", pin, direction, pull);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError> {
        let out = self
            .outputs
            .get_mut(&pin)
            .ok_or(HardwareError::PinNotClaimed(pin))?;
        out.set_state(level)
            .map_err(|e| HardwareError::WriteFailed {
                pin,
                reason: format!("{:?}", e),
            })
    }

    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError> {
        let input = self
            .inputs
            .get_mut(&pin)
            .ok_or(HardwareError::PinNotClaimed(pin))?;
        let high = embedded_hal::digital::InputPin::is_high(input).map_err(|e| {
            HardwareError::ReadFailed {
                pin,
                reason: format!("{:?}", e),
            }
        })?;
        Ok(PinState::from(high))
    }

    fn release_all(&mut self) -> Result<(), HardwareError> {
        info!(
            "gpio: releasing {} pin(s)",
            self.outputs.len() + self.inputs.len()
        );
        self.outputs.clear();
        self.inputs.clear();
        Ok(())
    }

    fn is_hardware(&self) -> bool {
        true
    }
}
