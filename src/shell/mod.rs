//! Command execution and platform queries.

pub mod command;
pub mod platform;

pub use command::{
    display_command, execute, execute_check, execute_program, CommandOptions, CommandResult,
};
pub use platform::{
    expand_home, is_ci, is_elevated, is_executable, parse_system_path, resolve_tool_path,
};
