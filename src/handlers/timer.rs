//! Timer handler for the AllyHub MCP server

use crate::AllyHub;
use crate::formatting;
use crate::validation::{self, TimerAction};
use mcp_attr::{Result as McpResult, bail_public};

impl AllyHub {
    /// Handles timer commands - applies the action and reports the timer afterwards.
    pub async fn handle_timer(&self, action: String) -> McpResult<String> {
        let action = validation::parse_timer_action(&action)?;
        tracing::debug!(?action, "timer command");

        let timer = self.timer.clone();
        let result = self
            .context
            .call(move || {
                match action {
                    TimerAction::Start => timer.start(),
                    TimerAction::Pause => timer.pause(),
                    TimerAction::Stop => timer.stop(),
                    TimerAction::Reset => timer.reset(),
                    TimerAction::Toggle => timer.toggle(),
                    TimerAction::Status => {}
                }
                formatting::format_timer(&timer)
            })
            .await;

        match result {
            Ok(report) => Ok(report.trim_end().to_string()),
            Err(e) => bail_public!(_, "Failed to run timer command: {}", e),
        }
    }
}
