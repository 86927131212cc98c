//! Fuzz target: `ResponseParser::parse`
//!
//! Feeds arbitrary model output into the parser and asserts that it never
//! panics, always keeps the raw text, and only ever yields registered
//! actions.
//!
//! cargo fuzz run fuzz_response_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use pilamp::app::actions::ActionRegistry;
use pilamp::app::parser::ResponseParser;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let registry = ActionRegistry::new();
    let parsed = ResponseParser::new(registry).parse(raw);

    assert_eq!(parsed.raw, raw);
    if let Some(action) = parsed.action {
        assert!(registry.validate(action.as_str()));
    }
    // A rejected name never turns into an action.
    if let Some(name) = &parsed.requested_action {
        assert_eq!(parsed.action.is_some(), registry.validate(name));
    }
});
