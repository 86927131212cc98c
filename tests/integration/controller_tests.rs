//! GpioController against a recording mock driver: lifecycle, blink worker
//! ownership of the pin, failure rollback and cleanup.

use std::time::Duration;

use pilamp::app::ports::{PinDirection, Pull};
use pilamp::config::{GpioConfig, PinNumbering, Platform};
use pilamp::drivers::gpio_controller::{GpioController, MAX_BLINK_DURATION, Phase};

use crate::mock_hw::{GpioCall, MockGpio, wait_until};

const LED: u8 = 17;
const BUTTON: u8 = 27;

fn make_controller(mock: &MockGpio) -> GpioController {
    GpioController::new(
        Box::new(mock.clone()),
        GpioConfig::default(),
        &Platform::simulated(),
    )
}

// ── Initialization ────────────────────────────────────────────

#[test]
fn initialize_configures_led_low_and_button_pull_up() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    assert!(ctl.initialize().success);
    assert_eq!(
        mock.calls(),
        vec![
            GpioCall::SetMode(PinNumbering::Bcm),
            GpioCall::Configure {
                pin: LED,
                direction: PinDirection::Output,
                pull: Pull::None
            },
            GpioCall::Write { pin: LED, high: false },
            GpioCall::Configure {
                pin: BUTTON,
                direction: PinDirection::Input,
                pull: Pull::Up
            },
        ]
    );
    assert!(ctl.initialize().success);
    assert_eq!(mock.call_count(), 4, "second initialize must be a no-op");
}

#[test]
fn init_failure_fails_fast_until_explicit_retry() {
    let mock = MockGpio::new();
    mock.fail_configure(true);
    let ctl = make_controller(&mock);

    let r = ctl.toggle_led(None);
    assert!(!r.success);
    assert_eq!(ctl.phase(), Phase::InitFailed);
    assert!(mock.released(), "partially claimed pins must be released");

    let before = mock.call_count();
    let r = ctl.toggle_led(None);
    assert_eq!(r.error.as_deref(), Some("GPIO not initialized"));
    assert_eq!(mock.call_count(), before, "lazy init must not retry");

    mock.fail_configure(false);
    assert!(ctl.initialize().success);
    assert_eq!(ctl.phase(), Phase::Initialized);
    assert!(ctl.toggle_led(None).success);
}

// ── Toggle ────────────────────────────────────────────────────

#[test]
fn toggle_turns_led_on_then_off() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);

    let r = ctl.toggle_led(None);
    assert!(r.success);
    assert_eq!(r.flag("led_on"), Some(true));
    assert_eq!(r.message.as_deref(), Some("LED is now ON"));
    assert_eq!(mock.last_write(LED), Some(true));

    let r = ctl.toggle_led(None);
    assert_eq!(r.flag("led_on"), Some(false));
    assert_eq!(r.message.as_deref(), Some("LED is now OFF"));
    assert_eq!(mock.last_write(LED), Some(false));
}

#[test]
fn write_failure_leaves_led_state_unchanged() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    assert!(ctl.toggle_led(Some(true)).success);

    mock.fail_writes(true);
    let r = ctl.toggle_led(None);
    assert!(!r.success);
    assert!(r.error.as_deref().unwrap_or_default().starts_with("hardware:"));
    assert!(ctl.state().led_on, "led_on must keep its pre-operation value");
}

// ── Blink ─────────────────────────────────────────────────────

#[test]
fn blink_reports_running_immediately() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);

    let r = ctl.blink_led(Duration::from_secs(5), Duration::from_millis(500));
    assert!(r.success);
    assert_eq!(r.flag("blinking"), Some(true));
    assert_eq!(r.get("duration").and_then(|v| v.as_f64()), Some(5.0));
    assert_eq!(r.get("speed").and_then(|v| v.as_f64()), Some(0.5));
    assert!(ctl.state().blinking);

    assert!(ctl.stop_blink().success);
}

#[test]
fn blink_alternates_the_pin() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(20));

    assert!(wait_until(Duration::from_secs(2), || mock.writes(LED).len() >= 4));
    ctl.stop_blink();

    // writes[0] is the low level from initialization
    let writes = mock.writes(LED);
    assert!(writes[1], "blink starts with the LED on");
    assert!(!writes[2]);
    assert!(writes[3]);
}

#[test]
fn stop_blink_twice_is_idempotent() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(50));

    let first = ctl.stop_blink();
    assert!(first.success);
    assert_eq!(first.flag("blinking"), Some(false));
    assert!(!ctl.state().blinking);
    assert!(!ctl.state().led_on);
    assert_eq!(mock.last_write(LED), Some(false));

    let count = mock.call_count();
    let second = ctl.stop_blink();
    assert!(second.success);
    assert_eq!(second.flag("blinking"), Some(false));
    assert_eq!(mock.call_count(), count, "second stop must not touch the pin");
}

#[test]
fn stop_without_blink_is_a_no_op() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    assert!(ctl.stop_blink().success);
    assert!(mock.calls().is_empty());
}

#[test]
fn toggle_during_blink_takes_the_pin_over() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(20));

    let r = ctl.toggle_led(Some(true));
    assert!(r.success);
    assert!(!ctl.state().blinking);
    assert!(ctl.state().led_on);
    assert_eq!(mock.last_write(LED), Some(true));

    let count = mock.call_count();
    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(mock.call_count(), count, "no residual background writes");
    assert_eq!(mock.last_write(LED), Some(true));
}

#[test]
fn new_blink_replaces_the_old_worker() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(20));
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(20));
    assert!(ctl.state().blinking);

    ctl.stop_blink();
    let count = mock.call_count();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(mock.call_count(), count);
}

#[test]
fn blink_expires_back_to_steady_off() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_millis(80), Duration::from_millis(20));

    assert!(wait_until(Duration::from_secs(2), || !ctl.state().blinking));
    let state = ctl.state();
    assert!(state.initialized);
    assert!(!state.led_on);
    assert_eq!(mock.last_write(LED), Some(false));

    // Stopping an expired blink joins the finished worker quietly.
    assert!(ctl.stop_blink().success);
}

#[test]
fn zero_duration_blink_leaves_led_off() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    assert!(ctl.blink_led(Duration::ZERO, Duration::from_millis(20)).success);
    assert!(wait_until(Duration::from_secs(2), || !ctl.state().blinking));
    assert!(!ctl.state().led_on);
}

#[test]
fn invalid_timing_is_rejected_before_touching_pins() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    let r = ctl.blink_led(Duration::from_secs(1), Duration::ZERO);
    assert!(!r.success);
    assert!(r.error.as_deref().unwrap_or_default().starts_with("invalid timing"));
    assert!(mock.calls().is_empty());
}

#[test]
fn overlong_blink_is_rejected_and_leaves_state_idle() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    let r = ctl.blink_led(Duration::from_secs(u64::MAX / 2), Duration::from_millis(20));
    assert!(!r.success);
    assert!(r.error.as_deref().unwrap_or_default().starts_with("invalid timing"));
    assert!(!ctl.state().blinking);
    assert!(mock.calls().is_empty());

    assert!(!ctl.blink_led_secs(1.0e18, 0.5).success);
    assert!(!ctl.state().blinking);
}

#[test]
fn day_long_blink_runs_until_stopped() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    let r = ctl.blink_led(MAX_BLINK_DURATION, Duration::from_millis(20));
    assert!(r.success);
    assert!(wait_until(Duration::from_secs(2), || mock.writes(LED).len() >= 3));
    assert!(ctl.state().blinking);
    assert!(ctl.stop_blink().success);
    assert!(!ctl.state().blinking);
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn status_reflects_blinking() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(50));
    let r = ctl.get_status();
    assert!(r.success);
    assert_eq!(r.flag("blinking"), Some(true));
    assert_eq!(r.flag("initialized"), Some(true));
    ctl.stop_blink();
    assert_eq!(ctl.get_status().flag("blinking"), Some(false));
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn button_press_reads_low() {
    let mock = MockGpio::hardware();
    let ctl = make_controller(&mock);

    let r = ctl.read_button();
    assert!(r.success);
    assert_eq!(r.flag("pressed"), Some(false));
    assert_eq!(r.get("raw_state").and_then(|v| v.as_u64()), Some(1));

    mock.press_button(true);
    let r = ctl.read_button();
    assert_eq!(r.flag("pressed"), Some(true));
    assert_eq!(r.get("raw_state").and_then(|v| v.as_u64()), Some(0));
    assert!(mock.calls().contains(&GpioCall::Read { pin: BUTTON }));
}

#[test]
fn button_not_configured() {
    let mock = MockGpio::hardware();
    let config = GpioConfig {
        button_pin: None,
        ..GpioConfig::default()
    };
    let ctl = GpioController::new(Box::new(mock.clone()), config, &Platform::simulated());
    let r = ctl.read_button();
    assert!(!r.success);
    assert_eq!(r.error.as_deref(), Some("button not configured"));
}

// ── Cleanup ───────────────────────────────────────────────────

#[test]
fn cleanup_stops_blink_and_releases_pins() {
    let mock = MockGpio::new();
    let ctl = make_controller(&mock);
    ctl.blink_led(Duration::from_secs(5), Duration::from_millis(20));

    assert!(ctl.cleanup().success);
    assert_eq!(ctl.phase(), Phase::Cleaned);
    assert_eq!(mock.calls().last(), Some(&GpioCall::ReleaseAll));
    assert_eq!(mock.last_write(LED), Some(false));
    let state = ctl.state();
    assert!(!state.initialized && !state.led_on && !state.blinking);

    let count = mock.call_count();
    assert!(ctl.cleanup().success);
    assert_eq!(mock.call_count(), count, "second cleanup is a no-op");

    let r = ctl.toggle_led(None);
    assert_eq!(r.error.as_deref(), Some("GPIO already cleaned up"));
    assert!(ctl.get_status().success);
}

#[test]
fn drop_runs_cleanup() {
    let mock = MockGpio::new();
    {
        let ctl = make_controller(&mock);
        ctl.toggle_led(Some(true));
    }
    assert!(mock.released());
    assert_eq!(mock.last_write(LED), Some(false));
}

#[test]
fn drop_of_untouched_controller_claims_nothing() {
    let mock = MockGpio::new();
    drop(make_controller(&mock));
    assert!(mock.calls().is_empty());
}
