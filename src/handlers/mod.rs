//! MCP tool handlers for the AllyHub server
//!
//! Each handler validates its arguments, runs the command on the execution
//! context and returns the text shown to the client.

pub mod status;
pub mod task;
pub mod timer;
