//! PiLamp — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RppalGpio / SimulatedGpio   EchoModel / CommandModel          │
//! │  (GpioPort)                  (ModelPort)                       │
//! │  SystemClock   FileConfigAdapter   LogEventSink                │
//! │  (ClockPort)   (ConfigPort)        (EventSink)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Assistant: ResponseParser · ActionRegistry ·          │    │
//! │  │             ActionDispatcher → GpioController          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  REPL (foreground) · blink worker · signal watcher             │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};

use pilamp::adapters::config_file::FileConfigAdapter;
use pilamp::adapters::log_sink::LogEventSink;
use pilamp::adapters::model;
use pilamp::adapters::sim_gpio::SimulatedGpio;
use pilamp::adapters::time::SystemClock;
use pilamp::app::actions::ActionRegistry;
use pilamp::app::commands::ReplCommand;
use pilamp::app::dispatcher::ActionDispatcher;
use pilamp::app::parser::ResponseParser;
use pilamp::app::ports::GpioPort;
use pilamp::app::prompt::PromptTemplate;
use pilamp::app::result::ActionResult;
use pilamp::app::service::{Assistant, TurnOutcome};
use pilamp::config::{AssistantConfig, Platform};
use pilamp::drivers::gpio_controller::GpioController;
use pilamp::drivers::worker;

const SIGNAL_STACK_KB: usize = 256;
/// Exit status after a terminating signal (128 + SIGINT).
const SIGNAL_EXIT_CODE: i32 = 130;

const HELP: &str = "\
Commands:
  What time is it?        - ask for the current time
  Turn on the LED         - toggle the LED
  Blink the light         - blink the LED
  Stop blinking           - stop the blink
  What's the status?      - GPIO and LED status
  status                  - status without asking the model
  help                    - this list
  quit / exit / bye       - leave";

// ── Driver selection ──────────────────────────────────────────

#[cfg(feature = "rpi")]
fn select_driver(config: &AssistantConfig, platform: &Platform) -> Box<dyn GpioPort> {
    if config.gpio.force_simulation {
        info!("GPIO: simulation forced by config");
        return Box::new(SimulatedGpio::new());
    }
    if !platform.is_raspberry_pi {
        warn!("GPIO: not a Raspberry Pi ({}), using simulation", platform.machine);
        return Box::new(SimulatedGpio::new());
    }
    match pilamp::adapters::rppal_gpio::RppalGpio::open() {
        Ok(driver) => Box::new(driver),
        Err(e) => {
            warn!("GPIO: rppal unavailable ({}), using simulation", e);
            Box::new(SimulatedGpio::new())
        }
    }
}

#[cfg(not(feature = "rpi"))]
fn select_driver(_config: &AssistantConfig, platform: &Platform) -> Box<dyn GpioPort> {
    if platform.is_raspberry_pi {
        warn!("GPIO: built without the `rpi` feature, using simulation");
    } else {
        warn!("GPIO: not a Raspberry Pi ({}), using simulation", platform.machine);
    }
    Box::new(SimulatedGpio::new())
}

// ── Signal watcher ────────────────────────────────────────────

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("signal: SIGTERM handler unavailable ({})", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Park a thread on a single-threaded runtime that waits for a terminating
/// signal, releases the pins and exits.
fn spawn_signal_watcher(controller: Arc<GpioController>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    worker::spawn_named("signal-watch", SIGNAL_STACK_KB, move || {
        runtime.block_on(shutdown_signal());
        println!("\nShutting down...");
        info!("signal: terminating, cleaning up GPIO");
        let result = controller.cleanup();
        if !result.success {
            error!("signal: cleanup failed: {}", result.error.as_deref().unwrap_or("?"));
        }
        std::process::exit(SIGNAL_EXIT_CODE);
    })?;
    Ok(())
}

// ── Output ────────────────────────────────────────────────────

fn print_result(result: &ActionResult) {
    if result.success {
        if let Some(message) = &result.message {
            println!("  > {}", message);
        }
    } else {
        println!(
            "  > Action failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

fn print_status(result: &ActionResult) {
    print_result(result);
    if let Some(data) = &result.data {
        for (key, value) in data {
            println!("    {}: {}", key, value);
        }
    }
}

fn print_turn(outcome: &TurnOutcome) {
    println!("AI: {}", outcome.response.text);
    if let Some(result) = &outcome.action_result {
        print_result(result);
    }
}

fn print_banner(platform: &Platform, controller: &GpioController) {
    println!("==============================================");
    println!("  PiLamp v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Platform: {}{}",
        platform.model.as_deref().unwrap_or(platform.machine),
        if controller.is_hardware() { "" } else { " (GPIO simulated)" }
    );
    println!("==============================================");
    println!("{}", HELP);
    println!();
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("PiLamp v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Config (or defaults) ───────────────────────────────
    let config = FileConfigAdapter::from_env().load_or_default();

    // ── 3. Platform + GPIO driver ─────────────────────────────
    let platform = Platform::detect();
    info!(
        "Platform: {} (raspberry_pi={})",
        platform.model.as_deref().unwrap_or(platform.machine),
        platform.is_raspberry_pi
    );
    let driver = select_driver(&config, &platform);
    let controller = Arc::new(GpioController::new(driver, config.gpio.clone(), &platform));

    let init = controller.initialize();
    if !init.success {
        warn!(
            "GPIO init failed ({}), actions will report errors",
            init.error.as_deref().unwrap_or("?")
        );
    }

    // ── 4. Signal watcher ─────────────────────────────────────
    if let Err(e) = spawn_signal_watcher(Arc::clone(&controller)) {
        warn!("signal watcher not started ({}), Ctrl-C will skip cleanup", e);
    }

    // ── 5. Assistant ──────────────────────────────────────────
    let registry = ActionRegistry::new();
    let dispatcher = ActionDispatcher::new(
        Arc::clone(&controller),
        registry,
        Box::new(SystemClock),
        config.blink.clone(),
    );
    let mut assistant = Assistant::new(
        ResponseParser::new(registry),
        dispatcher,
        PromptTemplate::new(config.model.clone()),
    );
    let mut model = model::from_backend(&config.model.backend);
    let mut sink = LogEventSink::new();

    if config.model.warm_up {
        assistant.warm_up(&mut model);
    }

    print_banner(&platform, &controller);

    // ── 6. REPL ───────────────────────────────────────────────
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match ReplCommand::parse(&line) {
            ReplCommand::Skip => {}
            ReplCommand::Quit => {
                println!("AI: Goodbye!");
                break;
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Status => print_status(&controller.get_status()),
            ReplCommand::Prompt(input) => {
                match assistant.process_input(&mut model, &input, &mut sink) {
                    Ok(outcome) => print_turn(&outcome),
                    Err(e) => println!("AI: Sorry, the model failed: {}", e),
                }
            }
        }
    }

    // ── 7. Cleanup ────────────────────────────────────────────
    let cleanup = controller.cleanup();
    if !cleanup.success {
        error!(
            "GPIO cleanup failed: {}",
            cleanup.error.as_deref().unwrap_or("?")
        );
    }
    info!("PiLamp stopped");
    Ok(())
}
