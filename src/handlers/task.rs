//! Task handler for the AllyHub MCP server

use crate::AllyHub;
use crate::formatting;
use crate::validation::{self, TaskCommand};
use mcp_attr::{Result as McpResult, bail_public};

impl AllyHub {
    /// Handles task list commands - applies the command and returns the updated list.
    ///
    /// Out-of-range indices are not errors: the list ignores them and the
    /// unchanged list is returned.
    pub async fn handle_task(
        &self,
        action: String,
        index: Option<i64>,
        title: Option<String>,
    ) -> McpResult<String> {
        let command = validation::parse_task_command(&action, index, title.as_deref())?;
        tracing::debug!(?command, "task command");

        let tasks = self.tasks.clone();
        let result = self
            .context
            .call(move || {
                match command {
                    TaskCommand::Next => tasks.next_task(),
                    TaskCommand::Previous => tasks.previous_task(),
                    TaskCommand::GoTo(index) => tasks.go_to_task(index),
                    TaskCommand::Add(title) => tasks.add_task(title),
                    TaskCommand::Remove(index) => tasks.remove_task(index),
                    TaskCommand::Complete => tasks.mark_current_task_completed(),
                    TaskCommand::Incomplete => tasks.mark_current_task_incomplete(),
                    TaskCommand::Toggle => tasks.toggle_current_task_completion(),
                    TaskCommand::Reset => tasks.reset_tasks(),
                }
                formatting::format_task_list(&tasks.tasks(), tasks.current_index())
            })
            .await;

        match result {
            Ok(list) => Ok(list.trim_end().to_string()),
            Err(e) => bail_public!(_, "Failed to run task command: {}", e),
        }
    }

    /// Handles list requests - numbered tasks with the cursor marked.
    pub async fn handle_list_tasks(&self) -> McpResult<String> {
        let tasks = self.tasks.clone();
        let result = self
            .context
            .call(move || formatting::format_task_list(&tasks.tasks(), tasks.current_index()))
            .await;

        match result {
            Ok(list) => Ok(list.trim_end().to_string()),
            Err(e) => bail_public!(_, "Failed to list tasks: {}", e),
        }
    }
}
