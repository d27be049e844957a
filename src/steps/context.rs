//! Everything a probe or action needs to reach the machine.

use crate::cache::CacheStore;
use crate::fetch::Fetcher;
use crate::host::Host;
use crate::shell::{expand_home, CommandOptions};
use std::path::{Path, PathBuf};

/// Explicit execution environment handed to every probe and action.
///
/// Nothing below this reads `$HOME`, `$USER` or the process working
/// directory directly; all of it comes from here.
pub struct ExecutionContext<'a> {
    /// The machine being provisioned.
    pub host: &'a dyn Host,

    /// Download cache.
    pub cache: &'a CacheStore,

    /// Network access for cache misses.
    pub fetcher: &'a dyn Fetcher,

    /// Home directory used to expand `~/`.
    pub home: PathBuf,

    /// Working directory for commands (the download directory).
    pub work_dir: Option<PathBuf>,

    /// Capture command output instead of streaming it to the terminal.
    pub capture_output: bool,
}

impl<'a> ExecutionContext<'a> {
    /// Create a context that captures command output and has no working directory.
    pub fn new(
        host: &'a dyn Host,
        cache: &'a CacheStore,
        fetcher: &'a dyn Fetcher,
        home: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host,
            cache,
            fetcher,
            home: home.into(),
            work_dir: None,
            capture_output: true,
        }
    }

    /// Run commands inside `dir`, if it exists.
    pub fn with_work_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.work_dir = dir.filter(|d| d.is_dir());
        self
    }

    /// Stream command output instead of capturing it.
    pub fn with_capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Expand a leading `~` in a configured path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        expand_home(path, &self.home)
    }

    /// Command options for an action's external commands.
    pub fn command_options(&self) -> CommandOptions {
        let base = if self.capture_output {
            CommandOptions::captured()
        } else {
            CommandOptions::interactive()
        };
        base.in_dir(self.work_dir.as_deref())
    }

    /// Command options for commands that must talk to the user.
    pub fn interactive_options(&self) -> CommandOptions {
        CommandOptions::interactive().in_dir(self.work_dir.as_deref())
    }
}
