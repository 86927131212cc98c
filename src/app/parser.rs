//! Model-output parser.
//!
//! Small quantised models are unreliable at strict formatting, so parsing
//! is two-tier:
//!
//! 1. **Structured** — the span from the first `{` to the last `}` is
//!    decoded as JSON `{"text": .., "action": ..}`. If decoding fails, a
//!    surrounding ```` ```json ```` fence is stripped and the whole reply is
//!    retried once.
//! 2. **Keywords** — when no usable object exists, the lower-cased reply is
//!    classified by keyword, first match wins:
//!
//! | Order | Condition                        | Action       |
//! |-------|----------------------------------|--------------|
//! | 1     | time / clock / hour              | `PrintTime`  |
//! | 2     | blink keyword + stop keyword     | `StopBlink`  |
//! | 3     | blink keyword                    | `BlinkLed`   |
//! | 4     | LED keyword, no blink keyword    | `ToggleLed`  |
//! | 5     | status / state                   | `GetStatus`  |
//!
//! Parsing never fails: every reply produces a [`ParsedResponse`].

use log::{debug, warn};
use serde_json::Value;

use super::actions::{ActionId, ActionRegistry};

const TIME_KEYWORDS: &[&str] = &["time", "clock", "hour"];
const BLINK_KEYWORDS: &[&str] = &["blink", "flash", "flicker"];
const STOP_KEYWORDS: &[&str] = &["stop", "end", "cease"];
const LED_KEYWORDS: &[&str] = &["led", "light", "turn on", "turn off", "toggle", "switch"];
const STATUS_KEYWORDS: &[&str] = &["status", "state"];

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// One model turn, reduced to what the caller needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Conversational text to show the user.
    pub text: String,
    /// Registry-approved action, if any.
    pub action: Option<ActionId>,
    /// Action string exactly as the model wrote it (structured replies only).
    pub requested_action: Option<String>,
    /// The model output, verbatim.
    pub raw: String,
}

/// Why the structured tier gave up. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseFailure {
    NoObject,
    InvalidJson(String),
    NotAnObject,
    MissingText,
}

struct StructuredReply {
    text: String,
    action: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    registry: ActionRegistry,
}

impl ResponseParser {
    pub const fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    pub fn parse(&self, raw: &str) -> ParsedResponse {
        match extract_structured(raw) {
            Ok(reply) => {
                let action = reply.action.as_deref().and_then(|name| {
                    let id = self.registry.lookup(name);
                    if id.is_none() {
                        warn!("parser: unknown action '{}' treated as no action", name);
                    }
                    id
                });
                ParsedResponse {
                    text: reply.text,
                    action,
                    requested_action: reply.action,
                    raw: raw.to_string(),
                }
            }
            Err(failure) => {
                debug!("parser: structured reply unusable ({:?}), using keywords", failure);
                classify_keywords(raw)
            }
        }
    }
}

// ── Structured tier ───────────────────────────────────────────

fn extract_structured(raw: &str) -> Result<StructuredReply, ParseFailure> {
    let candidate = brace_span(raw).ok_or(ParseFailure::NoObject)?;
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(v) => v,
        Err(first) => {
            debug!("parser: brace span is not JSON ({}), retrying without fences", first);
            serde_json::from_str::<Value>(strip_fences(raw))
                .map_err(|e| ParseFailure::InvalidJson(e.to_string()))?
        }
    };
    into_reply(value)
}

/// Greedy span from the first `{` to the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix(FENCE_OPEN) {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix(FENCE_CLOSE) {
        cleaned = rest;
    }
    cleaned.trim()
}

fn into_reply(value: Value) -> Result<StructuredReply, ParseFailure> {
    let Value::Object(mut map) = value else {
        return Err(ParseFailure::NotAnObject);
    };
    let text = match map.remove("text") {
        Some(Value::String(s)) => s,
        _ => return Err(ParseFailure::MissingText),
    };
    let action = match map.remove("action") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };
    Ok(StructuredReply { text, action })
}

// ── Keyword tier ──────────────────────────────────────────────

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn classify_keywords(raw: &str) -> ParsedResponse {
    let lower = raw.to_lowercase();
    let has_blink = contains_any(&lower, BLINK_KEYWORDS);

    let (action, text) = if contains_any(&lower, TIME_KEYWORDS) {
        (Some(ActionId::PrintTime), "I'll check the current time for you.")
    } else if has_blink && contains_any(&lower, STOP_KEYWORDS) {
        (Some(ActionId::StopBlink), "Stopping the blinking LED.")
    } else if has_blink {
        (Some(ActionId::BlinkLed), "I'll make the LED blink.")
    } else if contains_any(&lower, LED_KEYWORDS) {
        (Some(ActionId::ToggleLed), "I'll toggle the LED for you.")
    } else if contains_any(&lower, STATUS_KEYWORDS) {
        (Some(ActionId::GetStatus), "Here's the current system status.")
    } else {
        (None, raw)
    };

    ParsedResponse {
        text: text.to_string(),
        action,
        requested_action: None,
        raw: raw.to_string(),
    }
}
