//! LED / output-pin controller.
//!
//! Owns the only GPIO line the assistant drives, plus the optional
//! active-low button, behind a small state machine:
//!
//! ```text
//!  Uninitialized ──initialize──▶ Initialized ──▶ Steady(on|off) ⇄ Blinking
//!        │                            │                   │
//!        └──(driver error)──▶ InitFailed                  │
//!                                                         ▼
//!                      any state ──cleanup──▶ Cleaned (terminal)
//! ```
//!
//! ## Locking
//!
//! Two locks, always taken in this order:
//!
//! 1. `blink_slot` — held by every foreground operation that may spawn or
//!    join the blink worker. Serialises foreground callers (REPL, signal
//!    thread). The worker never takes it.
//! 2. `shared` — the [`GpioState`] *and* the driver. Every state change and
//!    every pin write happens under it, including the worker's.
//!
//! A joiner never holds `shared` while waiting, so the worker can always
//! finish its current write and exit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_hal::digital::PinState;
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::app::ports::{GpioPort, PinDirection, Pull};
use crate::app::result::ActionResult;
use crate::config::{GpioConfig, Platform};
use crate::error::{Error, HardwareError, Result};

use super::blink::{BlinkTask, CancelToken, FinishGuard};
use super::worker;

/// Upper bound on how long `stop_blink` waits for the worker.
const JOIN_BOUND: Duration = Duration::from_secs(2);
/// Longest blink accepted (one day).
pub const MAX_BLINK_DURATION: Duration = Duration::from_secs(86_400);
const BLINK_STACK_KB: usize = 64;
const BLINK_THREAD_NAME: &str = "gpio-blink";

/// Flags visible to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GpioState {
    pub initialized: bool,
    /// Meaningful only while `initialized`.
    pub led_on: bool,
    /// `true` iff one blink worker owns the pin.
    pub blinking: bool,
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    InitFailed,
    Cleaned,
}

/// Point-in-time status snapshot returned by `get_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpioStatus {
    pub initialized: bool,
    pub led_on: bool,
    pub blinking: bool,
    pub is_raspberry_pi: bool,
    pub gpio_available: bool,
    pub led_pin: u8,
    pub button_pin: Option<u8>,
}

struct Shared {
    state: GpioState,
    phase: Phase,
    /// Bumped on every blink start and stop.
    generation: u64,
    driver: Box<dyn GpioPort>,
}

pub struct GpioController {
    shared: Arc<Mutex<Shared>>,
    blink_slot: Mutex<Option<BlinkTask>>,
    config: GpioConfig,
    hardware: bool,
    is_raspberry_pi: bool,
}

impl GpioController {
    /// Wrap a driver. Nothing touches the pins until the first operation.
    pub fn new(driver: Box<dyn GpioPort>, config: GpioConfig, platform: &Platform) -> Self {
        let hardware = driver.is_hardware();
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: GpioState::default(),
                phase: Phase::Uninitialized,
                generation: 0,
                driver,
            })),
            blink_slot: Mutex::new(None),
            config,
            hardware,
            is_raspberry_pi: platform.is_raspberry_pi,
        }
    }

    // ── Operations ────────────────────────────────────────────

    /// Configure the pins and drive the LED low.
    ///
    /// Unlike the lazy initialization inside the other operations, an
    /// explicit call retries after an earlier failure.
    pub fn initialize(&self) -> ActionResult {
        let _slot = self.blink_slot.lock();
        let mut sh = self.shared.lock();
        match self.init_locked(&mut sh, true) {
            Ok(()) => ActionResult::ok()
                .with_message(format!("GPIO initialized, LED on pin {}", self.config.led_pin))
                .with("initialized", true),
            Err(e) => e.into(),
        }
    }

    /// Set the LED to `target`, or invert it when `target` is `None`.
    /// A running blink is stopped (and joined) first.
    pub fn toggle_led(&self, target: Option<bool>) -> ActionResult {
        match self.try_toggle(target) {
            Ok(on) => ActionResult::ok()
                .with_message(format!("LED is now {}", on_off(on)))
                .with("led_on", on),
            Err(e) => {
                warn!("gpio: toggle failed: {}", e);
                e.into()
            }
        }
    }

    /// Start blinking: the pin flips every `period / 2` for `duration`.
    /// Returns as soon as the worker is spawned.
    pub fn blink_led(&self, duration: Duration, period: Duration) -> ActionResult {
        match self.try_blink(duration, period) {
            Ok(()) => ActionResult::ok()
                .with_message(format!("Blinking LED for {} seconds", duration.as_secs_f64()))
                .with("blinking", true)
                .with("duration", duration.as_secs_f64())
                .with("speed", period.as_secs_f64()),
            Err(e) => {
                warn!("gpio: blink failed: {}", e);
                e.into()
            }
        }
    }

    /// [`blink_led`](Self::blink_led) taking seconds, as a model or user
    /// would supply them. Negative, NaN, zero-period or longer-than-a-day
    /// values are rejected.
    pub fn blink_led_secs(&self, duration_secs: f32, period_secs: f32) -> ActionResult {
        let Ok(duration) = Duration::try_from_secs_f32(duration_secs) else {
            return Error::InvalidTiming("duration must be a non-negative number").into();
        };
        let Ok(period) = Duration::try_from_secs_f32(period_secs) else {
            return Error::InvalidTiming("period must be a positive number").into();
        };
        self.blink_led(duration, period)
    }

    /// Cancel the blink worker, wait for it and leave the LED off.
    /// Succeeds when nothing is blinking.
    pub fn stop_blink(&self) -> ActionResult {
        let mut slot = self.blink_slot.lock();
        if self.stop_locked(&mut slot) {
            info!("gpio: blinking stopped");
        }
        ActionResult::ok()
            .with_message("Blinking stopped")
            .with("blinking", false)
    }

    /// Snapshot of the state plus platform flags. Never waits on the worker.
    pub fn get_status(&self) -> ActionResult {
        let status = self.status();
        let mut result = ActionResult::ok().with_message(format!(
            "LED is {}{}",
            on_off(status.led_on),
            if status.blinking { " (blinking)" } else { "" }
        ));
        if let Ok(Value::Object(map)) = serde_json::to_value(&status) {
            result.data = Some(map);
        }
        result
    }

    /// Sample the button. Pull-up wiring: a press reads LOW.
    pub fn read_button(&self) -> ActionResult {
        match self.try_read_button() {
            Ok(level) => {
                let pressed = level == PinState::Low;
                ActionResult::ok()
                    .with_message(if pressed { "Button pressed" } else { "Button released" })
                    .with("pressed", pressed)
                    .with("raw_state", u8::from(level == PinState::High))
            }
            Err(e) => e.into(),
        }
    }

    /// Stop blinking, drive the LED low and release every pin.
    /// Idempotent; safe from a signal-handling thread.
    pub fn cleanup(&self) -> ActionResult {
        let mut slot = self.blink_slot.lock();
        self.stop_locked(&mut slot);

        let mut sh = self.shared.lock();
        if sh.phase == Phase::Cleaned {
            return ActionResult::ok().with_message("GPIO already cleaned up");
        }
        info!("gpio: cleaning up");

        let mut release_error = None;
        if sh.state.initialized {
            if sh.state.led_on {
                if let Err(e) = sh.driver.write(self.config.led_pin, PinState::Low) {
                    warn!("gpio: could not drive LED low before release: {}", e);
                }
            }
            if let Err(e) = sh.driver.release_all() {
                error!("gpio: release failed: {}", e);
                release_error = Some(Error::from(e));
            }
        }
        sh.state = GpioState::default();
        sh.phase = Phase::Cleaned;

        match release_error {
            Some(e) => e.into(),
            None => ActionResult::ok().with_message("GPIO cleanup complete"),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> GpioState {
        self.shared.lock().state
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    pub fn status(&self) -> GpioStatus {
        let state = self.state();
        GpioStatus {
            initialized: state.initialized,
            led_on: state.led_on,
            blinking: state.blinking,
            is_raspberry_pi: self.is_raspberry_pi,
            gpio_available: self.hardware,
            led_pin: self.config.led_pin,
            button_pin: self.config.button_pin,
        }
    }

    pub fn is_hardware(&self) -> bool {
        self.hardware
    }

    // ── Internal ──────────────────────────────────────────────

    fn try_toggle(&self, target: Option<bool>) -> Result<bool> {
        let mut slot = self.blink_slot.lock();
        self.init_locked(&mut self.shared.lock(), false)?;
        self.stop_locked(&mut slot);

        let mut sh = self.shared.lock();
        let on = target.unwrap_or(!sh.state.led_on);
        sh.driver.write(self.config.led_pin, PinState::from(on))?;
        sh.state.led_on = on;
        info!("gpio: LED turned {} (pin {})", on_off(on), self.config.led_pin);
        Ok(on)
    }

    fn try_blink(&self, duration: Duration, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(Error::InvalidTiming("period must be positive"));
        }
        if duration > MAX_BLINK_DURATION || period > MAX_BLINK_DURATION {
            return Err(Error::InvalidTiming("blink longer than one day"));
        }
        let mut slot = self.blink_slot.lock();
        self.init_locked(&mut self.shared.lock(), false)?;
        self.stop_locked(&mut slot);

        let token = {
            let mut sh = self.shared.lock();
            sh.generation += 1;
            sh.state.blinking = true;
            CancelToken::new(sh.generation)
        };

        let shared = Arc::clone(&self.shared);
        let worker_token = token.clone();
        let pin = self.config.led_pin;
        let half = period / 2;
        let spawned = worker::spawn_named(BLINK_THREAD_NAME, BLINK_STACK_KB, move || {
            run_blink(&shared, &worker_token, pin, duration, half);
        });

        match spawned {
            Ok(handle) => {
                info!(
                    "gpio: blinking for {:?} at {:?} period (gen {})",
                    duration,
                    period,
                    token.generation()
                );
                *slot = Some(BlinkTask::new(token, handle));
                Ok(())
            }
            Err(e) => {
                let mut sh = self.shared.lock();
                if sh.generation == token.generation() {
                    sh.state.blinking = false;
                }
                Err(HardwareError::SpawnFailed(e.to_string()).into())
            }
        }
    }

    fn try_read_button(&self) -> Result<PinState> {
        if !self.hardware {
            return Err(Error::SimulationUnsupported);
        }
        let pin = self.config.button_pin.ok_or(Error::NotConfigured("button"))?;
        let _slot = self.blink_slot.lock();
        let mut sh = self.shared.lock();
        self.init_locked(&mut sh, false)?;
        Ok(sh.driver.read(pin)?)
    }

    /// Cancel and join the current worker (if any), then force the LED off.
    /// Caller holds the blink slot. Returns `true` if a blink was stopped.
    fn stop_locked(&self, slot: &mut Option<BlinkTask>) -> bool {
        let task = slot.take();
        let was_blinking = {
            let mut sh = self.shared.lock();
            sh.generation += 1;
            sh.state.blinking
        };

        if let Some(task) = task {
            task.stop(JOIN_BOUND);
        }

        let mut sh = self.shared.lock();
        sh.state.blinking = false;
        if was_blinking && sh.state.initialized {
            match sh.driver.write(self.config.led_pin, PinState::Low) {
                Ok(()) => sh.state.led_on = false,
                Err(e) => warn!("gpio: could not drive LED low after blink: {}", e),
            }
        }
        was_blinking
    }

    fn init_locked(&self, sh: &mut Shared, retry_failed: bool) -> Result<()> {
        match sh.phase {
            Phase::Initialized => return Ok(()),
            Phase::Cleaned => return Err(Error::ControllerClosed),
            Phase::InitFailed if !retry_failed => return Err(Error::InitFailed),
            Phase::Uninitialized | Phase::InitFailed => {}
        }

        match configure_pins(sh.driver.as_mut(), &self.config) {
            Ok(()) => {
                sh.phase = Phase::Initialized;
                sh.state.initialized = true;
                sh.state.led_on = false;
                info!(
                    "gpio: initialized ({}), LED on pin {}",
                    if self.hardware { "hardware" } else { "simulation" },
                    self.config.led_pin
                );
                Ok(())
            }
            Err(e) => {
                error!("gpio: initialization failed: {}", e);
                if let Err(release) = sh.driver.release_all() {
                    warn!("gpio: release after failed init: {}", release);
                }
                sh.phase = Phase::InitFailed;
                sh.state = GpioState::default();
                Err(e.into())
            }
        }
    }
}

impl Drop for GpioController {
    fn drop(&mut self) {
        let live = self.phase() == Phase::Initialized || self.blink_slot.lock().is_some();
        if live {
            let _ = self.cleanup();
        }
    }
}

fn configure_pins(driver: &mut dyn GpioPort, config: &GpioConfig) -> core::result::Result<(), HardwareError> {
    driver.set_mode(config.pin_numbering)?;
    driver.configure_pin(config.led_pin, PinDirection::Output, Pull::None)?;
    driver.write(config.led_pin, PinState::Low)?;
    if let Some(button) = config.button_pin {
        driver.configure_pin(button, PinDirection::Input, Pull::Up)?;
    }
    Ok(())
}

/// Blink worker body. Alternates the pin until cancelled or `duration`
/// elapses, then (if still the current generation) leaves it low.
fn run_blink(
    shared: &Mutex<Shared>,
    token: &CancelToken,
    pin: u8,
    duration: Duration,
    half_period: Duration,
) {
    let _finished = FinishGuard(token.clone());
    let start = Instant::now();
    let deadline = start.checked_add(duration).unwrap_or(start + MAX_BLINK_DURATION);
    let mut level = PinState::High;

    loop {
        let now = Instant::now();
        if token.is_cancelled() || now >= deadline {
            break;
        }
        {
            let mut sh = shared.lock();
            if sh.generation != token.generation() {
                return;
            }
            if let Err(e) = sh.driver.write(pin, level) {
                error!("gpio: blink write failed: {}", e);
                break;
            }
            sh.state.led_on = level == PinState::High;
        }
        if token.sleep(half_period.min(deadline - now)) {
            break;
        }
        level = !level;
    }

    let mut sh = shared.lock();
    if sh.generation != token.generation() {
        return;
    }
    if let Err(e) = sh.driver.write(pin, PinState::Low) {
        error!("gpio: could not drive LED low after blink: {}", e);
    }
    sh.state.led_on = false;
    sh.state.blinking = false;
    info!("gpio: blink finished (gen {})", token.generation());
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
