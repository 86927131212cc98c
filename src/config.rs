//! System configuration parameters
//!
//! All tunable parameters for PiLamp. Values can be overridden by a JSON
//! file (see [`FileConfigAdapter`](crate::adapters::config_file::FileConfigAdapter)).
//! Missing fields fall back to the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Pin numbering scheme handed to the GPIO driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinNumbering {
    /// Broadcom SoC channel numbers (GPIO17, ...).
    Bcm,
    /// Physical header positions (pin 11, ...).
    Board,
}

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub gpio: GpioConfig,
    pub blink: BlinkConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub pin_numbering: PinNumbering,
    /// Output pin driving the LED.
    pub led_pin: u8,
    /// Active-low button input, `None` when no button is wired.
    pub button_pin: Option<u8>,
    /// Use the simulated driver even on a Raspberry Pi.
    pub force_simulation: bool,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            pin_numbering: PinNumbering::Bcm,
            led_pin: pins::LED_GPIO,
            button_pin: Some(pins::BUTTON_GPIO),
            force_simulation: false,
        }
    }
}

const DEFAULT_BLINK_DURATION_SECS: u64 = 5;
const DEFAULT_BLINK_PERIOD_MS: u64 = 500;
/// Upper bound for `blink.duration_secs` and `blink.period_secs` (one day).
pub const MAX_BLINK_SECS: f32 = 86_400.0;

/// Defaults used when the `blink_led` action carries no parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Total blink time (seconds).
    pub duration_secs: f32,
    /// Full on/off cycle (seconds); the pin flips every half period.
    pub period_secs: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_BLINK_DURATION_SECS as f32,
            period_secs: DEFAULT_BLINK_PERIOD_MS as f32 / 1000.0,
        }
    }
}

impl BlinkConfig {
    /// Out-of-range values fall back to the defaults.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.duration_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_BLINK_DURATION_SECS))
    }

    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f32(self.period_secs)
            .unwrap_or(Duration::from_millis(DEFAULT_BLINK_PERIOD_MS))
    }
}

/// Which language-model adapter answers prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelBackend {
    /// Reply with the user's own words.
    Echo,
    /// Pipe the prompt into an external program (e.g. `llama-cli`).
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Sampling parameters, tuned for a 360M model on a Pi Zero 2W.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    pub max_tokens: u32,
    /// Low temperature keeps the JSON format stable.
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub stop: Vec<String>,
    /// Send a short "Hello" turn at startup.
    pub warm_up: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Echo,
            max_tokens: 150,
            temperature: 0.2,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop: vec!["User:".into(), "###".into()],
            warm_up: true,
        }
    }
}

impl AssistantConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gpio = &self.gpio;
        if gpio.led_pin > pins::MAX_GPIO {
            return Err(ConfigError::ValidationFailed("gpio.led_pin out of range"));
        }
        if let Some(button) = gpio.button_pin {
            if button > pins::MAX_GPIO {
                return Err(ConfigError::ValidationFailed("gpio.button_pin out of range"));
            }
            if button == gpio.led_pin {
                return Err(ConfigError::ValidationFailed(
                    "gpio.button_pin must differ from gpio.led_pin",
                ));
            }
        }

        let blink = &self.blink;
        if !(0.0..=MAX_BLINK_SECS).contains(&blink.duration_secs) {
            return Err(ConfigError::ValidationFailed(
                "blink.duration_secs must be between 0 and 86400",
            ));
        }
        if !(blink.period_secs > 0.0 && blink.period_secs <= MAX_BLINK_SECS) {
            return Err(ConfigError::ValidationFailed(
                "blink.period_secs must be positive and at most 86400",
            ));
        }

        let model = &self.model;
        if model.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed("model.max_tokens must be > 0"));
        }
        if let ModelBackend::Command { program, .. } = &model.backend {
            if program.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "model.backend.program must not be empty",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Platform detection
// ---------------------------------------------------------------------------

const DEVICE_TREE_MODEL: &str = "/proc/device-tree/model";

/// What board we are running on, detected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub is_raspberry_pi: bool,
    /// CPU architecture (`std::env::consts::ARCH`).
    pub machine: &'static str,
    /// Device-tree model string, when the kernel exposes one.
    pub model: Option<String>,
}

impl Platform {
    pub fn detect() -> Self {
        let model = std::fs::read_to_string(DEVICE_TREE_MODEL)
            .ok()
            .map(|m| m.trim_end_matches('\0').trim().to_string());
        Self::from_parts(std::env::consts::ARCH, std::env::consts::OS, model)
    }

    fn from_parts(machine: &'static str, os: &str, model: Option<String>) -> Self {
        let model_says_pi = model
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains("raspberry pi"));
        let arm_linux = os == "linux" && (machine.starts_with("arm") || machine == "aarch64");
        Self {
            is_raspberry_pi: model_says_pi || arm_linux,
            machine,
            model,
        }
    }

    /// A platform that never touches hardware (tests, desktops).
    pub fn simulated() -> Self {
        Self {
            is_raspberry_pi: false,
            machine: std::env::consts::ARCH,
            model: None,
        }
    }
}
