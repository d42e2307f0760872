//! NutriTrack backend library
//!
//! User profiles, nutrition goals and food lookup behind an MCP server.

pub mod auth;
pub mod build_info;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod store;
pub mod tools;
