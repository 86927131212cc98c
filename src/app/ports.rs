//! Port traits — the hexagonal boundary between the action core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GpioController / Assistant (domain)
//! ```
//!
//! Driven adapters (GPIO driver, language model, clock, config file, event
//! sink) implement these traits. The domain only ever sees the trait, so
//! every operation is testable with the recording mocks in
//! `tests/integration/mock_hw.rs`.

use chrono::{DateTime, Local};
use embedded_hal::digital::PinState;

use crate::config::{AssistantConfig, PinNumbering};
use crate::error::HardwareError;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain ↔ pins)
// ───────────────────────────────────────────────────────────────

/// Direction a pin is claimed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Internal bias resistor for input pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// GPIO driver capability, selected once at startup and injected into
/// [`GpioController`](crate::drivers::gpio_controller::GpioController).
///
/// Two implementations exist: the rppal-backed hardware driver and the
/// in-memory simulation. The controller serialises every call behind its
/// state lock, so implementations need not be internally synchronised.
pub trait GpioPort: Send {
    /// Select the pin numbering scheme. Called once before any pin is claimed.
    fn set_mode(&mut self, scheme: PinNumbering) -> Result<(), HardwareError>;

    /// Claim `pin` with the given direction and bias.
    fn configure_pin(
        &mut self,
        pin: u8,
        direction: PinDirection,
        pull: Pull,
    ) -> Result<(), HardwareError>;

    /// Drive an output pin.
    fn write(&mut self, pin: u8, level: PinState) -> Result<(), HardwareError>;

    /// Sample an input pin.
    fn read(&mut self, pin: u8) -> Result<PinState, HardwareError>;

    /// Release every claimed pin back to its reset state.
    fn release_all(&mut self) -> Result<(), HardwareError>;

    /// `true` when this driver touches real pins.
    fn is_hardware(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Model port (driven adapter: domain → language model)
// ───────────────────────────────────────────────────────────────

/// One completion request. The prompt is fully rendered; `user_input` is
/// kept alongside for adapters that do not run a real model.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub user_input: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub stop: Vec<String>,
}

/// The language model is a black box returning raw text for a prompt.
pub trait ModelPort {
    fn complete(&mut self, request: &GenerationRequest) -> Result<String, ModelError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for the `print_time` action.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The assistant emits structured [`AssistantEvent`](super::events::AssistantEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AssistantEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`AssistantConfig`].
///
/// Implementations MUST validate before persisting, and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] instead of clamping.
pub trait ConfigPort {
    /// Returns [`AssistantConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<AssistantConfig, ConfigError>;

    fn save(&self, config: &AssistantConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    NotFound,
    /// The file exists but is not valid JSON for [`AssistantConfig`].
    Corrupted(String),
    /// A field failed range validation.
    ValidationFailed(&'static str),
    Io(String),
}

/// Errors from [`ModelPort`] operations.
#[derive(Debug)]
pub enum ModelError {
    /// The model process could not be started.
    Spawn(String),
    /// Writing the prompt or reading the reply failed.
    Io(String),
    /// The model process exited unsuccessfully.
    ExitStatus(i32),
    /// The model produced nothing usable.
    EmptyOutput,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl core::fmt::Display for ModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spawn(msg) => write!(f, "model spawn failed: {}", msg),
            Self::Io(msg) => write!(f, "model I/O failed: {}", msg),
            Self::ExitStatus(code) => write!(f, "model exited with status {}", code),
            Self::EmptyOutput => write!(f, "model returned no output"),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for ModelError {}
