//! Formatting helpers for the control surface and the status bar
//!
//! Everything here reads the models and produces display strings; nothing
//! mutates state.

use crate::tasks::{NO_TASKS_TITLE, Task, TaskList};
use crate::timer::{CountdownTimer, TimerStatus};
use anyhow::{Context, Result};
use serde::Serialize;

/// Product name shown in the status-bar tooltip
pub const APP_NAME: &str = "AllyHub";

/// Alert text raised once when the countdown reaches zero
pub const COMPLETION_ALERT: &str = "Timer completed! Time for the next task.";

/// Tooltip for the status-bar item, e.g. `AllyHub - 00:59:59 (Running)`
pub fn status_tooltip(timer: &CountdownTimer) -> String {
    format!(
        "{} - {} ({})",
        APP_NAME,
        timer.formatted_time(),
        timer.status()
    )
}

/// Status-bar title, e.g. `00:59:59 · Email triage (1/4)`
pub fn status_title(timer: &CountdownTimer, tasks: &TaskList) -> String {
    format!(
        "{} · {} ({}/{})",
        timer.formatted_time(),
        tasks.current_task_title(),
        tasks.completed_tasks_count(),
        tasks.len()
    )
}

/// Multi-line timer report
pub fn format_timer(timer: &CountdownTimer) -> String {
    let mut result = format!(
        "Timer: {} ({})\n",
        timer.formatted_time(),
        timer.status()
    );
    result.push_str(&format!("  Progress: {:.0}%\n", timer.progress() * 100.0));
    if timer.is_completed() {
        result.push_str("  Completed\n");
    }
    result
}

/// Numbered task list with completion markers and the cursor
///
/// # Arguments
/// * `tasks` - Tasks in list order
/// * `current_index` - Cursor position; ignored when `tasks` is empty
pub fn format_task_list(tasks: &[Task], current_index: usize) -> String {
    if tasks.is_empty() {
        return NO_TASKS_TITLE.to_string();
    }

    let completed = tasks.iter().filter(|t| t.is_completed).count();
    let mut result = format!(
        "Tasks ({}/{} completed):\n",
        completed,
        tasks.len()
    );
    for (index, task) in tasks.iter().enumerate() {
        let cursor = if index == current_index { ">" } else { " " };
        let mark = if task.is_completed { "x" } else { " " };
        result.push_str(&format!(
            "{} {}. [{}] {}\n",
            cursor, index, mark, task.title
        ));
    }
    result
}

/// One-line summary of both models
pub fn format_status(timer: &CountdownTimer, tasks: &TaskList) -> String {
    format!(
        "{} | Task {}/{}: {} | Tasks done: {:.0}%",
        status_tooltip(timer),
        if tasks.is_empty() { 0 } else { tasks.current_index() + 1 },
        tasks.len(),
        tasks.current_task_title(),
        tasks.progress() * 100.0
    )
}

#[derive(Debug, Serialize)]
struct TimerSnapshot {
    remaining_time: i64,
    total_duration: i64,
    status: TimerStatus,
    formatted_time: String,
    progress: f64,
    is_completed: bool,
}

#[derive(Debug, Serialize)]
struct Snapshot {
    current_index: usize,
    current_task_title: String,
    completed_tasks_count: usize,
    progress: f64,
    timer: TimerSnapshot,
    tasks: Vec<Task>,
}

/// Export every observable value as TOML
pub fn render_snapshot(timer: &CountdownTimer, tasks: &TaskList) -> Result<String> {
    let snapshot = Snapshot {
        current_index: tasks.current_index(),
        current_task_title: tasks.current_task_title(),
        completed_tasks_count: tasks.completed_tasks_count(),
        progress: tasks.progress(),
        timer: TimerSnapshot {
            remaining_time: timer.remaining_time(),
            total_duration: timer.total_duration(),
            status: timer.status(),
            formatted_time: timer.formatted_time(),
            progress: timer.progress(),
            is_completed: timer.is_completed(),
        },
        tasks: tasks.tasks(),
    };
    toml::to_string_pretty(&snapshot).context("serialize snapshot")
}
