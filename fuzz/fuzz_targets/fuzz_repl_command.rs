//! Fuzz target: `ReplCommand::parse`
//!
//! cargo fuzz run fuzz_repl_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use pilamp::app::commands::ReplCommand;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    if let ReplCommand::Prompt(prompt) = ReplCommand::parse(&line) {
        assert!(!prompt.is_empty());
        assert_eq!(prompt, prompt.trim());
    }
});
