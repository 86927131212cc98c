//! Language-model adapters implementing [`ModelPort`].
//!
//! | Adapter        | Backend                                          |
//! |----------------|--------------------------------------------------|
//! | `EchoModel`    | none; replies with the user's own words          |
//! | `CommandModel` | external program, prompt on stdin, reply on stdout |

use std::io::Write;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::app::ports::{GenerationRequest, ModelError, ModelPort};
use crate::config::ModelBackend;

/// Returns the user input unchanged, so the keyword tier of the parser
/// classifies what the user typed. Useful without a model installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoModel;

impl ModelPort for EchoModel {
    fn complete(&mut self, request: &GenerationRequest) -> Result<String, ModelError> {
        Ok(request.user_input.clone())
    }
}

/// Runs `program args..` once per request.
#[derive(Debug, Clone)]
pub struct CommandModel {
    program: String,
    args: Vec<String>,
}

impl CommandModel {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl ModelPort for CommandModel {
    fn complete(&mut self, request: &GenerationRequest) -> Result<String, ModelError> {
        debug!("model: running {} ({} prompt bytes)", self.program, request.prompt.len());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ModelError::Spawn(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.prompt.as_bytes())
                .map_err(|e| ModelError::Io(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ModelError::Io(e.to_string()))?;
        if !output.status.success() {
            return Err(ModelError::ExitStatus(output.status.code().unwrap_or(-1)));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let reply = truncate_at_stop(text.trim(), &request.stop).trim();
        if reply.is_empty() {
            return Err(ModelError::EmptyOutput);
        }
        Ok(reply.to_string())
    }
}

/// Build the adapter selected in the config.
pub fn from_backend(backend: &ModelBackend) -> Box<dyn ModelPort> {
    match backend {
        ModelBackend::Echo => {
            info!("model: echo backend");
            Box::new(EchoModel)
        }
        ModelBackend::Command { program, args } => {
            info!("model: command backend ({})", program);
            Box::new(CommandModel::new(program.clone(), args.clone()))
        }
    }
}

impl ModelPort for Box<dyn ModelPort> {
    fn complete(&mut self, request: &GenerationRequest) -> Result<String, ModelError> {
        (**self).complete(request)
    }
}

/// Cut `text` at the earliest stop sequence.
fn truncate_at_stop<'a>(text: &'a str, stop: &[String]) -> &'a str {
    let cut = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}
