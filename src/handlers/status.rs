//! Status and snapshot handlers for the AllyHub MCP server

use crate::AllyHub;
use crate::formatting;
use mcp_attr::{Result as McpResult, bail_public};

impl AllyHub {
    /// Handles status requests - one line covering the timer and the current task.
    pub async fn handle_status(&self) -> McpResult<String> {
        let timer = self.timer.clone();
        let tasks = self.tasks.clone();
        match self
            .context
            .call(move || formatting::format_status(&timer, &tasks))
            .await
        {
            Ok(status) => Ok(status),
            Err(e) => bail_public!(_, "Failed to read status: {}", e),
        }
    }

    /// Handles snapshot requests - every observable value rendered as TOML.
    pub async fn handle_snapshot(&self) -> McpResult<String> {
        let timer = self.timer.clone();
        let tasks = self.tasks.clone();
        let rendered = self
            .context
            .call(move || formatting::render_snapshot(&timer, &tasks))
            .await;

        match rendered {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(e)) | Err(e) => bail_public!(_, "Failed to build snapshot: {}", e),
        }
    }
}
