//! Prompt rendering for the language model.

use crate::config::ModelConfig;

use super::ports::GenerationRequest;

/// Instructions prepended to every turn. The model is asked for a single
/// JSON object; the parser copes when it does not comply.
pub const SYSTEM_PROMPT: &str = r#"You are an AI assistant running on a Raspberry Pi Zero 2W. You can tell the current time and control an LED on a GPIO pin.

RESPONSE FORMAT RULES:
1. Always answer with exactly this JSON object:
{
  "text": "Your conversational response here",
  "action": "action_name" OR null
}

2. "text" holds your normal conversational reply.

3. "action" is one of these, only when requested:
- "print_time": the user asks about the time or the clock
- "toggle_led": the user asks to turn the LED or light on/off, or to toggle it
- "blink_led": the user asks to blink or flash the LED
- "stop_blink": the user asks to stop blinking
- "get_status": the user asks for the system or LED status
- null: everything else

4. EXAMPLES:
- User: "What time is it?" -> {"text": "I'll check the time.", "action": "print_time"}
- User: "Turn on the LED" -> {"text": "Turning on the LED.", "action": "toggle_led"}
- User: "Blink the light" -> {"text": "I'll make it blink.", "action": "blink_led"}
- User: "Hello" -> {"text": "Hello! I'm ready.", "action": null}

5. Never guess the time. Always use "print_time".
6. Keep replies brief.
7. Output only the JSON object."#;

/// Greeting used to warm the model up at startup.
pub const WARM_UP_INPUT: &str = "Hello";

/// Builds [`GenerationRequest`]s from user input and the model config.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    config: ModelConfig,
}

impl PromptTemplate {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            config,
        }
    }

    pub fn render(&self, user_input: &str) -> String {
        format!("{}\n\nUser: {}\nAssistant:", self.system, user_input)
    }

    pub fn request(&self, user_input: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: self.render(user_input),
            user_input: user_input.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            repeat_penalty: self.config.repeat_penalty,
            stop: self.config.stop.clone(),
        }
    }

    /// Short, near-deterministic request for the startup warm-up.
    pub fn warm_up_request(&self) -> GenerationRequest {
        let mut request = self.request(WARM_UP_INPUT);
        request.max_tokens = request.max_tokens.min(50);
        request.temperature = 0.1;
        request.stop = vec!["User:".into(), "\n\n".into()];
        request
    }
}
