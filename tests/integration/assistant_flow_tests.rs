//! End-to-end turns: model reply → parser → registry → dispatcher → pins.

use std::sync::Arc;

use pilamp::adapters::model::EchoModel;
use pilamp::app::actions::{ActionId, ActionRegistry};
use pilamp::app::dispatcher::ActionDispatcher;
use pilamp::app::events::AssistantEvent;
use pilamp::app::parser::ResponseParser;
use pilamp::app::prompt::PromptTemplate;
use pilamp::app::service::Assistant;
use pilamp::config::{BlinkConfig, GpioConfig, ModelConfig, Platform};
use pilamp::drivers::gpio_controller::GpioController;

use crate::mock_hw::{FixedClock, MockGpio, RecordingSink, ScriptedModel};

const LED: u8 = 17;

fn make_assistant(mock: &MockGpio) -> Assistant {
    let controller = GpioController::new(
        Box::new(mock.clone()),
        GpioConfig::default(),
        &Platform::simulated(),
    );
    let registry = ActionRegistry::new();
    let dispatcher = ActionDispatcher::new(
        Arc::new(controller),
        registry,
        Box::new(FixedClock::at(12, 0, 0)),
        BlinkConfig::default(),
    );
    Assistant::new(
        ResponseParser::new(registry),
        dispatcher,
        PromptTemplate::new(ModelConfig::default()),
    )
}

#[test]
fn structured_toggle_turns_the_led_on() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&[r#"{"text":"Turning it on.","action":"toggle_led"}"#]);
    let mut sink = RecordingSink::new();

    let out = assistant
        .process_input(&mut model, "turn on the light", &mut sink)
        .unwrap();

    assert_eq!(out.response.text, "Turning it on.");
    assert_eq!(out.response.action, Some(ActionId::ToggleLed));
    assert!(out.action_executed);
    let result = out.action_result.unwrap();
    assert!(result.success);
    assert_eq!(result.flag("led_on"), Some(true));
    assert_eq!(mock.last_write(LED), Some(true));
    assert_eq!(sink.completed(), 1);
}

#[test]
fn keyword_blink_starts_immediately() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&["Please blink the light for a bit"]);
    let mut sink = RecordingSink::new();

    let out = assistant.process_input(&mut model, "blink", &mut sink).unwrap();

    assert_eq!(out.response.action, Some(ActionId::BlinkLed));
    let result = out.action_result.unwrap();
    assert!(result.success);
    assert_eq!(result.flag("blinking"), Some(true));
    assert!(assistant.dispatcher().controller().state().blinking);

    assistant.dispatcher().controller().stop_blink();
}

#[test]
fn unknown_action_is_rejected_without_dispatch() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&[r#"{"text":"3, 2, 1...","action":"launch_rocket"}"#]);
    let mut sink = RecordingSink::new();

    let out = assistant.process_input(&mut model, "launch", &mut sink).unwrap();

    assert!(!out.action_executed);
    assert!(out.action_result.is_none());
    assert_eq!(out.response.action, None);
    assert_eq!(out.response.requested_action.as_deref(), Some("launch_rocket"));
    assert_eq!(sink.rejected(), vec!["launch_rocket"]);
    assert!(mock.calls().is_empty());
}

#[test]
fn fenced_json_inside_prose_is_honoured() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let reply = "Sure!\n```json\n{\"text\": \"It is noon.\", \"action\": \"print_time\"}\n```";
    let mut model = ScriptedModel::new(&[reply]);
    let mut sink = RecordingSink::new();

    let out = assistant.process_input(&mut model, "time?", &mut sink).unwrap();

    assert_eq!(out.response.text, "It is noon.");
    let result = out.action_result.unwrap();
    assert_eq!(result.message.as_deref(), Some("The current time is 12:00:00"));
    assert_eq!(assistant.last_response(), Some(reply));
}

#[test]
fn blink_then_stop_across_turns() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&[
        r#"{"text":"Blinking.","action":"blink_led"}"#,
        "OK, I will stop the flashing now.",
    ]);
    let mut sink = RecordingSink::new();

    assistant.process_input(&mut model, "blink", &mut sink).unwrap();
    let out = assistant.process_input(&mut model, "stop", &mut sink).unwrap();

    assert_eq!(out.response.action, Some(ActionId::StopBlink));
    let state = assistant.dispatcher().controller().state();
    assert!(!state.blinking);
    assert!(!state.led_on);
    assert_eq!(mock.last_write(LED), Some(false));
}

#[test]
fn plain_chat_runs_nothing() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&["Hello there, how can I help?"]);
    let mut sink = RecordingSink::new();

    let out = assistant.process_input(&mut model, "hi", &mut sink).unwrap();

    assert!(!out.action_executed);
    assert_eq!(out.response.text, "Hello there, how can I help?");
    assert!(matches!(sink.events[0], AssistantEvent::Replied { .. }));
}

#[test]
fn prompt_is_rendered_for_the_model() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::new(&[r#"{"text":"Hi","action":null}"#]);
    let mut sink = RecordingSink::new();

    assistant.process_input(&mut model, "Hello", &mut sink).unwrap();

    let request = &model.requests[0];
    assert_eq!(request.user_input, "Hello");
    assert!(request.prompt.ends_with("User: Hello\nAssistant:"));
    assert_eq!(request.max_tokens, 150);
}

#[test]
fn model_failure_is_an_error_turn() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut model = ScriptedModel::failing("pipe closed");
    let mut sink = RecordingSink::new();

    assert!(assistant.process_input(&mut model, "hi", &mut sink).is_err());
    assert!(matches!(sink.events[0], AssistantEvent::ModelFailed { .. }));
    assert!(mock.calls().is_empty());
}

#[test]
fn echo_model_acts_on_the_users_words() {
    let mock = MockGpio::new();
    let mut assistant = make_assistant(&mock);
    let mut sink = RecordingSink::new();

    let out = assistant
        .process_input(&mut EchoModel, "What's the status?", &mut sink)
        .unwrap();
    assert_eq!(out.response.action, Some(ActionId::GetStatus));
    assert!(out.action_result.unwrap().success);
}
