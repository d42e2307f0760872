//! NutriTrack Tools module
//!
//! Request handlers behind the MCP tools.

pub mod foods;
pub mod status;
pub mod users;
