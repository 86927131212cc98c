//! Outbound assistant events.
//!
//! The [`Assistant`](super::service::Assistant) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (the default one logs them).

use super::actions::ActionId;
use super::result::ActionResult;

/// Structured events emitted by the assistant core.
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// The model replied; carries the text shown to the user.
    Replied { text: String },

    /// The model asked for an action the registry does not know.
    ActionRejected { name: String },

    /// A validated action was dispatched and finished.
    ActionCompleted {
        action: ActionId,
        result: ActionResult,
    },

    /// The model call itself failed.
    ModelFailed { reason: String },
}
