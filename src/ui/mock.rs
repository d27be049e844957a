//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use rigup::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("git_user_name", "Ada Lovelace");
//!
//! let answer = ui.prompt(&Prompt::input("git_user_name", "Name?")).unwrap();
//! assert_eq!(answer.as_string(), "Ada Lovelace");
//! assert_eq!(ui.prompts_shown(), ["git_user_name"]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;

use super::{
    parse_bool, OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface,
};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    skips: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    steps: Vec<String>,
    hints: Vec<String>,
    progress: Vec<(usize, usize)>,
    spinners: Vec<String>,
    spinner_finishes: Rc<RefCell<Vec<String>>>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::with_mode(OutputMode::Normal)
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured skipped messages.
    pub fn skips(&self) -> &[String] {
        &self.skips
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Names of steps announced in the foreground.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Get all captured hints.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Get all captured progress updates.
    pub fn progress(&self) -> &[(usize, usize)] {
        &self.progress
    }

    /// Get all spinner messages that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Final spinner lines, prefixed with `ok:`, `error:` or `skip:`.
    pub fn spinner_finishes(&self) -> Vec<String> {
        self.spinner_finishes.borrow().clone()
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific hint was shown.
    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn skipped(&mut self, msg: &str) {
        self.skips.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let response = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .unwrap_or_default();

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_bool(&response)),
            PromptType::Input => PromptResult::String(response),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            finishes: Rc::clone(&self.spinner_finishes),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step(&mut self, name: &str, _description: &str) {
        self.steps.push(name.to_string());
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        self.progress.push((current, total));
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records how it finished.
#[derive(Debug, Default)]
pub struct MockSpinner {
    finishes: Rc<RefCell<Vec<String>>>,
}

impl MockSpinner {
    /// A spinner whose finishes are not observed.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.finishes.borrow_mut().push(format!("ok: {}", msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finishes.borrow_mut().push(format!("error: {}", msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finishes.borrow_mut().push(format!("skip: {}", msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_output() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.warning("careful");
        ui.show_header("rigup");

        assert_eq!(ui.messages(), ["hello"]);
        assert!(ui.has_warning("care"));
        assert_eq!(ui.headers(), ["rigup"]);
    }

    #[test]
    fn confirm_prompt_parses_response() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("go", "y");

        let answer = ui.prompt(&Prompt::confirm("go", "Go?")).unwrap();
        assert_eq!(answer, PromptResult::Bool(true));
    }

    #[test]
    fn unanswered_prompt_uses_default_then_empty() {
        let mut ui = MockUI::new();

        let with_default = ui
            .prompt(&Prompt::input("email", "Email?").with_default("a@b.c"))
            .unwrap();
        assert_eq!(with_default.as_string(), "a@b.c");

        let empty = ui.prompt(&Prompt::input("name", "Name?")).unwrap();
        assert_eq!(empty.as_string(), "");
    }

    #[test]
    fn spinner_finishes_are_visible_to_the_ui() {
        let mut ui = MockUI::new();
        {
            let mut spinner = ui.start_spinner("curl");
            spinner.finish_skipped("curl");
        }
        let mut spinner = ui.start_spinner("git");
        spinner.finish_success("git");

        assert_eq!(ui.spinners(), ["curl", "git"]);
        assert_eq!(ui.spinner_finishes(), ["skip: curl", "ok: git"]);
    }
}
