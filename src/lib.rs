//! AllyHub Core Library
//!
//! The model layer of a menu-bar productivity companion: one countdown timer
//! and one ordered task list, both exposing their state through observable
//! fields that a status-bar UI subscribes to.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **Execution Layer**: `context` - the single designated execution context
//!   every command and every notification runs on
//! - **Domain Layer**: `timer`, `tasks` and `observable` - the two state
//!   machines and their change-notification channel
//! - **Surface Layer**: `AllyHub` (MCP tools) and `presenter` - thin consumers
//!   that issue commands and render state
//!
//! # Example
//!
//! ```
//! use allyhub::{MainContext, TaskList};
//!
//! let (context, mut context_loop) = MainContext::new();
//! let tasks = TaskList::new(context);
//!
//! tasks.mark_current_task_completed();
//! assert_eq!(tasks.current_index(), 1);
//! assert_eq!(tasks.progress(), 0.25);
//!
//! // Deliver pending change notifications
//! context_loop.run_until_idle();
//! ```

pub mod config;
pub mod context;
pub mod formatting;
mod handlers;
pub mod observable;
pub mod presenter;
pub mod tasks;
pub mod timer;
pub mod validation;

use mcp_attr::Result as McpResult;
use mcp_attr::server::{McpServer, mcp_server};

// Re-export commonly used types
pub use config::Config;
pub use context::{ContextLoop, MainContext};
pub use observable::{EventStream, Observable, Subscription};
pub use presenter::{StatusBarPresenter, StatusBarView};
pub use tasks::{NO_TASKS_TITLE, Task, TaskList};
pub use timer::{CountdownTimer, TimerSettings, TimerStatus};

/// Composition root and MCP server handler
///
/// Owns the timer and the task list for the lifetime of the process and
/// exposes their commands as MCP tools. Every tool call is marshalled onto
/// the designated execution context, so a [`ContextLoop`] must be running for
/// tools to complete.
pub struct AllyHub {
    pub(crate) context: MainContext,
    pub(crate) timer: CountdownTimer,
    pub(crate) tasks: TaskList,
}

impl AllyHub {
    /// Create the models described by `config`
    ///
    /// # Arguments
    /// * `context` - Execution context shared by both models
    /// * `config` - Validated configuration
    pub fn new(context: MainContext, config: &Config) -> Self {
        let timer = CountdownTimer::with_settings(context.clone(), config.timer.settings());
        let tasks = TaskList::with_seed(context.clone(), config.tasks.seed.clone());
        tracing::info!(
            total_duration_secs = timer.total_duration(),
            task_count = tasks.len(),
            "models created"
        );
        Self {
            context,
            timer,
            tasks,
        }
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn context(&self) -> &MainContext {
        &self.context
    }
}

impl Drop for AllyHub {
    fn drop(&mut self) {
        // The ticker must not outlive the composition root
        self.timer.stop();
    }
}

/// AllyHub focus companion: a one-hour countdown timer plus an ordered list of tasks with a cursor.
///
/// Typical loop: `status` to see where you are → `timer_command` start → work on the current task →
/// `task_command` complete (moves to the next task automatically) → repeat.
///
/// Task indices are zero-based. Out-of-range indices are ignored rather than rejected.
#[mcp_server]
impl McpServer for AllyHub {
    /// **Timer**: Control the countdown. Completed timers (00:00:00) ignore start; use reset.
    #[tool]
    async fn timer_command(
        &self,
        /// Action: start/pause/stop/reset/toggle/status
        action: String,
    ) -> McpResult<String> {
        self.handle_timer(action).await
    }

    /// **Tasks**: Navigate and edit the task list. `complete` also moves to the next task.
    #[tool]
    async fn task_command(
        &self,
        /// Action: next/previous/go_to/add/remove/complete/incomplete/toggle/reset
        action: String,
        /// Zero-based task index (required for go_to and remove)
        index: Option<i64>,
        /// Task title (required for add)
        title: Option<String>,
    ) -> McpResult<String> {
        self.handle_task(action, index, title).await
    }

    /// **List**: Show all tasks with completion marks; `>` marks the current task.
    #[tool]
    async fn list_tasks(&self) -> McpResult<String> {
        self.handle_list_tasks().await
    }

    /// **Status**: One-line summary of the timer and the current task.
    #[tool]
    async fn status(&self) -> McpResult<String> {
        self.handle_status().await
    }

    /// **Snapshot**: Full timer and task state as TOML.
    #[tool]
    async fn snapshot(&self) -> McpResult<String> {
        self.handle_snapshot().await
    }
}
