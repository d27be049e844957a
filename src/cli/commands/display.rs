//! Shared display helpers.
//!
//! Used by `run --dry-run` and `status` to render step previews the same
//! way, and by every `--json` flag.

use serde::Serialize;

use crate::runner::StepPreview;
use crate::ui::UserInterface;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One status line for a previewed step.
pub fn preview_line(step: &StepPreview) -> String {
    if step.satisfied {
        format!("{} - already done", step.name)
    } else {
        let critical = if step.critical { " (critical)" } else { "" };
        format!("○ {} - would {}{}", step.name, step.action, critical)
    }
}

/// Print every previewed step, then how many would run.
pub fn show_previews(ui: &mut dyn UserInterface, previews: &[StepPreview]) {
    for step in previews {
        let line = preview_line(step);
        if step.satisfied {
            ui.skipped(&line);
        } else {
            ui.message(&format!("  {}", line));
        }
    }

    let pending = previews.iter().filter(|p| !p.satisfied).count();
    ui.message(&format!("\n{} of {} steps would run", pending, previews.len()));
}
