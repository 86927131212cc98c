//! Action identifiers and the registry that gates them.
//!
//! The registry is the only way a string coming out of the language model
//! becomes something the dispatcher will run. Matching is exact and
//! case-sensitive: `"Toggle_LED"` is rejected just like `"launch_rocket"`.

use std::collections::BTreeSet;
use std::fmt;

/// Every hardware or system action the assistant can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionId {
    PrintTime,
    ToggleLed,
    BlinkLed,
    StopBlink,
    GetStatus,
}

impl ActionId {
    /// All actions, in wire order.
    pub const ALL: [ActionId; 5] = [
        ActionId::PrintTime,
        ActionId::ToggleLed,
        ActionId::BlinkLed,
        ActionId::StopBlink,
        ActionId::GetStatus,
    ];

    /// Wire-level identifier used in model output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrintTime => "print_time",
            Self::ToggleLed => "toggle_led",
            Self::BlinkLed => "blink_led",
            Self::StopBlink => "stop_blink",
            Self::GetStatus => "get_status",
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whitelist of recognised action names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRegistry;

impl ActionRegistry {
    pub const fn new() -> Self {
        Self
    }

    /// Map a wire name onto its action, `None` for anything unrecognised.
    pub fn lookup(&self, name: &str) -> Option<ActionId> {
        ActionId::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn validate(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn known_actions(&self) -> BTreeSet<ActionId> {
        ActionId::ALL.into_iter().collect()
    }
}
