//! Validation helpers for the control surface
//!
//! Tool arguments arrive as loose strings and optional numbers. They are
//! checked here, before anything is posted to the execution context; the
//! models only ever see well-formed commands.

use mcp_attr::Result as McpResult;
use std::str::FromStr;

/// Commands accepted by the `timer` tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Stop,
    Reset,
    Toggle,
    /// Report only
    Status,
}

impl FromStr for TimerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(TimerAction::Start),
            "pause" => Ok(TimerAction::Pause),
            "stop" => Ok(TimerAction::Stop),
            "reset" => Ok(TimerAction::Reset),
            "toggle" => Ok(TimerAction::Toggle),
            "status" => Ok(TimerAction::Status),
            _ => Err(format!(
                "Invalid timer action '{}'. Valid actions: start, pause, stop, reset, toggle, status",
                s
            )),
        }
    }
}

/// Commands accepted by the `task` tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Next,
    Previous,
    GoTo,
    Add,
    Remove,
    Complete,
    Incomplete,
    Toggle,
    Reset,
}

impl FromStr for TaskAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "next" => Ok(TaskAction::Next),
            "previous" | "prev" => Ok(TaskAction::Previous),
            "go_to" | "goto" => Ok(TaskAction::GoTo),
            "add" => Ok(TaskAction::Add),
            "remove" => Ok(TaskAction::Remove),
            "complete" => Ok(TaskAction::Complete),
            "incomplete" => Ok(TaskAction::Incomplete),
            "toggle" => Ok(TaskAction::Toggle),
            "reset" => Ok(TaskAction::Reset),
            _ => Err(format!(
                "Invalid task action '{}'. Valid actions: next, previous, go_to, add, remove, complete, incomplete, toggle, reset",
                s
            )),
        }
    }
}

/// A task command with its arguments checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Next,
    Previous,
    GoTo(i64),
    Add(String),
    Remove(i64),
    Complete,
    Incomplete,
    Toggle,
    Reset,
}

fn invalid_params(message: String) -> mcp_attr::Error {
    mcp_attr::Error::new(mcp_attr::ErrorCode::INVALID_PARAMS).with_message(message, true)
}

/// Parse the `action` argument of the `timer` tool
pub fn parse_timer_action(action: &str) -> McpResult<TimerAction> {
    action.parse::<TimerAction>().map_err(invalid_params)
}

/// Check a task title; surrounding whitespace is trimmed
///
/// # Returns
/// The trimmed title, or `None` if nothing is left
pub fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the arguments of the `task` tool into a command
///
/// # Arguments
/// * `action` - Action name
/// * `index` - Required by `go_to` and `remove`; range is not checked here
/// * `title` - Required by `add`
pub fn parse_task_command(
    action: &str,
    index: Option<i64>,
    title: Option<&str>,
) -> McpResult<TaskCommand> {
    let action = action.parse::<TaskAction>().map_err(invalid_params)?;
    let require_index = |name: &str| {
        index.ok_or_else(|| invalid_params(format!("Action '{}' requires an index", name)))
    };

    Ok(match action {
        TaskAction::Next => TaskCommand::Next,
        TaskAction::Previous => TaskCommand::Previous,
        TaskAction::GoTo => TaskCommand::GoTo(require_index("go_to")?),
        TaskAction::Remove => TaskCommand::Remove(require_index("remove")?),
        TaskAction::Add => {
            let title = title.and_then(normalize_title).ok_or_else(|| {
                invalid_params("Action 'add' requires a non-empty title".to_string())
            })?;
            TaskCommand::Add(title)
        }
        TaskAction::Complete => TaskCommand::Complete,
        TaskAction::Incomplete => TaskCommand::Incomplete,
        TaskAction::Toggle => TaskCommand::Toggle,
        TaskAction::Reset => TaskCommand::Reset,
    })
}
