//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing assistant events to the `log`
//! facade as single-line tagged records.

use log::{info, warn};

use crate::app::events::AssistantEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AssistantEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AssistantEvent) {
        match event {
            AssistantEvent::Replied { text } => {
                info!("REPLY | {}", text);
            }
            AssistantEvent::ActionRejected { name } => {
                warn!("REJECT | unknown action '{}'", name);
            }
            AssistantEvent::ActionCompleted { action, result } => {
                if result.success {
                    info!(
                        "ACTION | {} ok | {}",
                        action,
                        result.message.as_deref().unwrap_or("-")
                    );
                } else {
                    warn!(
                        "ACTION | {} failed | {}",
                        action,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            AssistantEvent::ModelFailed { reason } => {
                warn!("MODEL | {}", reason);
            }
        }
    }
}
