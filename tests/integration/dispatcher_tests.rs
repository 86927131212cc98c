//! ActionDispatcher: action → controller mapping and the registry gate.

use std::sync::Arc;
use std::time::Duration;

use pilamp::app::actions::{ActionId, ActionRegistry};
use pilamp::app::dispatcher::ActionDispatcher;
use pilamp::config::{BlinkConfig, GpioConfig, Platform};
use pilamp::drivers::gpio_controller::GpioController;

use crate::mock_hw::{FixedClock, MockGpio, wait_until};

fn make_dispatcher(mock: &MockGpio, blink: BlinkConfig) -> ActionDispatcher {
    let controller = GpioController::new(
        Box::new(mock.clone()),
        GpioConfig::default(),
        &Platform::simulated(),
    );
    ActionDispatcher::new(
        Arc::new(controller),
        ActionRegistry::new(),
        Box::new(FixedClock::at(9, 30, 0)),
        blink,
    )
}

#[test]
fn print_time_uses_the_clock_port() {
    let mock = MockGpio::new();
    let d = make_dispatcher(&mock, BlinkConfig::default());
    let r = d.execute(ActionId::PrintTime);
    assert!(r.success);
    assert_eq!(r.message.as_deref(), Some("The current time is 09:30:00"));
    assert_eq!(r.get("time").and_then(|v| v.as_str()), Some("09:30:00"));
    assert_eq!(r.get("date").and_then(|v| v.as_str()), Some("2024-06-01"));
    assert!(mock.calls().is_empty(), "print_time never touches GPIO");
}

#[test]
fn blink_uses_configured_defaults() {
    let mock = MockGpio::new();
    let d = make_dispatcher(&mock, BlinkConfig::default());
    let r = d.execute(ActionId::BlinkLed);
    assert!(r.success);
    assert_eq!(r.get("duration").and_then(|v| v.as_f64()), Some(5.0));
    assert_eq!(r.get("speed").and_then(|v| v.as_f64()), Some(0.5));
    assert!(d.execute(ActionId::StopBlink).success);
    assert!(!d.controller().state().blinking);
}

#[test]
fn short_configured_blink_expires() {
    let mock = MockGpio::new();
    let blink = BlinkConfig {
        duration_secs: 0.05,
        period_secs: 0.02,
    };
    let d = make_dispatcher(&mock, blink);
    assert!(d.execute(ActionId::BlinkLed).success);
    let controller = d.controller();
    assert!(wait_until(Duration::from_secs(2), || !controller.state().blinking));
}

#[test]
fn every_registered_name_dispatches() {
    let mock = MockGpio::new();
    let d = make_dispatcher(&mock, BlinkConfig::default());
    for action in ActionRegistry::new().known_actions() {
        let r = d.execute_named(action.as_str());
        assert!(r.success, "{} failed: {:?}", action, r.error);
    }
    d.execute(ActionId::StopBlink);
}

#[test]
fn unregistered_names_never_reach_the_controller() {
    let mock = MockGpio::new();
    let d = make_dispatcher(&mock, BlinkConfig::default());
    for name in ["launch_rocket", "", "Toggle_LED", "TOGGLE_LED", "toggle_led "] {
        let r = d.execute_named(name);
        assert!(!r.success, "{:?} must be rejected", name);
        assert!(r.error.as_deref().unwrap_or_default().starts_with("unknown action"));
    }
    assert!(mock.calls().is_empty());
}

#[test]
fn get_status_carries_platform_flags() {
    let mock = MockGpio::new();
    let d = make_dispatcher(&mock, BlinkConfig::default());
    let r = d.execute(ActionId::GetStatus);
    assert_eq!(r.flag("is_raspberry_pi"), Some(false));
    assert_eq!(r.flag("gpio_available"), Some(false));
    assert_eq!(r.get("button_pin").and_then(|v| v.as_u64()), Some(27));
}
