//! Default GPIO assignments for the Raspberry Pi Zero 2W board.
//!
//! Numbers are BCM (Broadcom SoC channel) numbers, not physical header
//! positions. The config file can override them; these are the defaults
//! every other module falls back to.

// ---------------------------------------------------------------------------
// Indicator LED
// ---------------------------------------------------------------------------

/// Digital output driving the indicator LED (active HIGH).
/// GPIO17 = physical pin 11.
pub const LED_GPIO: u8 = 17;

// ---------------------------------------------------------------------------
// User button (active-low with pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button input. GPIO27 = physical pin 13.
pub const BUTTON_GPIO: u8 = 27;

/// Highest pin number accepted by config validation (40-pin header).
pub const MAX_GPIO: u8 = 40;
