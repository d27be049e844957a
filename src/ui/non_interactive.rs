//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, RigupError};

use super::{
    parse_bool, OutputMode, Prompt, PromptResult, PromptType, RigupTheme, SpinnerHandle,
    UserInterface,
};

/// Environment prefix for answering prompts without a terminal.
pub const PROMPT_ENV_PREFIX: &str = "RIGUP_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Lines are printed plainly, spinners become a single start line, and
/// prompts are answered from `RIGUP_PROMPT_<KEY>` or the prompt default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
    theme: RigupTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
            theme: RigupTheme::plain(),
        }
    }

    fn answer(&self, prompt: &Prompt, value: &str) -> PromptResult {
        match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_bool(value)),
            PromptType::Input => PromptResult::String(value.to_string()),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_warnings() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_skipped(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_warnings() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return Ok(self.answer(prompt, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(self.answer(prompt, default));
        }

        Err(RigupError::ConfigValidationError {
            message: format!(
                "Cannot prompt for '{}' in non-interactive mode (set {} or configure it)",
                prompt.key, env_key
            ),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            println!("  {}", message);
        }
        Box::new(LineSpinner {
            theme: self.theme.clone(),
            mode: self.mode,
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", self.theme.format_header(title));
        }
    }

    fn show_step(&mut self, name: &str, description: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_step(name, description));
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_status() {
            println!("[{}/{}]", current, total);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_warnings() {
            println!("{}", self.theme.format_hint(hint));
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints the final line only.
struct LineSpinner {
    theme: RigupTheme,
    mode: OutputMode,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_warnings() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_skipped(msg));
        }
    }
}
