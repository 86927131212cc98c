//! Unified error types for PiLamp.
//!
//! A single [`Error`] enum that every subsystem converts into, so the
//! action layer can turn any failure into an `ActionResult` the same way.
//! Nothing in this module panics; every variant renders a short, human
//! readable message that ends up in `ActionResult.error`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation of the action core funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pin configuration, write, read or release failed.
    Hardware(HardwareError),
    /// The requested capability has no pin configured (e.g. no button).
    NotConfigured(&'static str),
    /// The capability needs real GPIO and we are running simulated.
    SimulationUnsupported,
    /// An action name outside the registry.
    UnknownAction(String),
    /// Blink duration or period is negative, zero or not finite.
    InvalidTiming(&'static str),
    /// Initialization failed earlier and lazy re-init is not attempted.
    InitFailed,
    /// The controller has been cleaned up; the pins are released.
    ControllerClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::NotConfigured(what) => write!(f, "{what} not configured"),
            Self::SimulationUnsupported => write!(f, "not available in simulation mode"),
            Self::UnknownAction(name) => write!(f, "unknown action '{name}'"),
            Self::InvalidTiming(msg) => write!(f, "invalid timing: {msg}"),
            Self::InitFailed => write!(f, "GPIO not initialized"),
            Self::ControllerClosed => write!(f, "GPIO already cleaned up"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`GpioPort`](crate::app::ports::GpioPort) driver.
///
/// The `String` payloads carry the driver's own error text (rppal, sysfs),
/// which is why this type is not `Copy` like the rest of the firmware-style
/// enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// Pin numbering scheme could not be selected.
    ModeFailed(String),
    /// Pin could not be claimed or set to the requested direction.
    ConfigureFailed { pin: u8, reason: String },
    /// Output level write failed.
    WriteFailed { pin: u8, reason: String },
    /// Input level read failed.
    ReadFailed { pin: u8, reason: String },
    /// Operation on a pin that was never configured.
    PinNotClaimed(u8),
    /// Releasing claimed pins failed.
    ReleaseFailed(String),
    /// The blink worker thread could not be spawned.
    SpawnFailed(String),
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeFailed(r) => write!(f, "pin mode failed: {r}"),
            Self::ConfigureFailed { pin, reason } => {
                write!(f, "configure GPIO{pin} failed: {reason}")
            }
            Self::WriteFailed { pin, reason } => write!(f, "write GPIO{pin} failed: {reason}"),
            Self::ReadFailed { pin, reason } => write!(f, "read GPIO{pin} failed: {reason}"),
            Self::PinNotClaimed(pin) => write!(f, "GPIO{pin} not configured"),
            Self::ReleaseFailed(r) => write!(f, "release failed: {r}"),
            Self::SpawnFailed(r) => write!(f, "blink worker spawn failed: {r}"),
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
