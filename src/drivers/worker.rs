//! Named background thread spawning.
//!
//! Wraps `std::thread::Builder` so every worker gets a readable name in
//! `top -H` / `ps -L` and an explicit stack size. Spawn failure is returned
//! to the caller, never a panic.

use std::io;
use std::thread::JoinHandle;

/// Spawn a named thread with a `stack_kb` KiB stack.
pub fn spawn_named(
    name: &str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::debug!("Spawning '{}' (stack={}KB)", name, stack_kb);

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
