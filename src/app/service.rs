//! Assistant service — one conversational turn, end to end.
//!
//! [`Assistant`] owns the parser and the dispatcher. The language model and
//! the event sink are injected at call sites, so a turn can be driven by a
//! scripted model in tests exactly as by the real one.
//!
//! ```text
//!  ModelPort ──raw──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                     │  Assistant                  │
//!                     │  parse · gate · dispatch    │ ──▶ GpioController
//!                     └────────────────────────────┘
//! ```

use log::{info, warn};

use super::dispatcher::ActionDispatcher;
use super::events::AssistantEvent;
use super::parser::{ParsedResponse, ResponseParser};
use super::ports::{EventSink, ModelError, ModelPort};
use super::prompt::PromptTemplate;
use super::result::ActionResult;

/// What one turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub response: ParsedResponse,
    pub action_executed: bool,
    pub action_result: Option<ActionResult>,
}

pub struct Assistant {
    parser: ResponseParser,
    dispatcher: ActionDispatcher,
    prompt: PromptTemplate,
    last_response: Option<String>,
}

impl Assistant {
    pub fn new(parser: ResponseParser, dispatcher: ActionDispatcher, prompt: PromptTemplate) -> Self {
        Self {
            parser,
            dispatcher,
            prompt,
            last_response: None,
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Raw text of the most recent model reply.
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Ask the model about `input`, then act on its reply.
    ///
    /// Only the model call can fail; everything after it is encoded in the
    /// returned [`TurnOutcome`].
    pub fn process_input(
        &mut self,
        model: &mut impl ModelPort,
        input: &str,
        sink: &mut impl EventSink,
    ) -> Result<TurnOutcome, ModelError> {
        let request = self.prompt.request(input);
        let raw = match model.complete(&request) {
            Ok(raw) => raw,
            Err(e) => {
                sink.emit(&AssistantEvent::ModelFailed {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };
        Ok(self.handle_reply(&raw, sink))
    }

    /// Parse a raw model reply and dispatch its action, if the registry
    /// allows it.
    pub fn handle_reply(&mut self, raw: &str, sink: &mut impl EventSink) -> TurnOutcome {
        self.last_response = Some(raw.to_string());
        let response = self.parser.parse(raw);
        sink.emit(&AssistantEvent::Replied {
            text: response.text.clone(),
        });

        let action_result = match response.action {
            Some(action) => {
                let result = self.dispatcher.execute(action);
                sink.emit(&AssistantEvent::ActionCompleted {
                    action,
                    result: result.clone(),
                });
                Some(result)
            }
            None => {
                if let Some(name) = &response.requested_action {
                    sink.emit(&AssistantEvent::ActionRejected { name: name.clone() });
                }
                None
            }
        };

        TurnOutcome {
            action_executed: action_result.is_some(),
            action_result,
            response,
        }
    }

    /// Send a short greeting so the first real turn is not slowed by model
    /// load. Failure is reported, never fatal. Nothing is dispatched.
    pub fn warm_up(&mut self, model: &mut impl ModelPort) -> bool {
        info!("assistant: warming up model");
        match model.complete(&self.prompt.warm_up_request()) {
            Ok(raw) => {
                self.last_response = Some(raw);
                info!("assistant: model ready");
                true
            }
            Err(e) => {
                warn!("assistant: warm-up failed: {}", e);
                false
            }
        }
    }
}
