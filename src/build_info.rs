//! Build metadata
//!
//! `build.rs` stamps each compile with a counter and a UTC timestamp; this
//! module exposes them together with the package version for the status tool
//! and the startup banner.

use serde::Serialize;

/// Service name reported by health checks
pub const SERVICE_NAME: &str = "nutritrack-backend";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("NUTRITRACK_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("NUTRITRACK_BUILD_TIMESTAMP");

/// Build counter, 0 when the build script did not run or wrote garbage
fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// What is running
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            service: SERVICE_NAME,
            version: VERSION,
            build_number: parse_build_number(RAW_BUILD_NUMBER),
            build_timestamp: RAW_BUILD_TIMESTAMP.unwrap_or("unknown"),
        }
    }

    /// One-line identification, e.g. `nutritrack-backend 1.0.0 (build 12, 2026-01-01T00:00:00Z)`
    pub fn summary(&self) -> String {
        format!(
            "{} {} (build {}, {})",
            self.service, self.version, self.build_number, self.build_timestamp
        )
    }
}

/// Print the startup banner to stderr (stdout carries MCP traffic)
pub fn print_startup_banner(environment: &str) {
    let info = BuildInfo::current();
    eprintln!("NutriTrack backend");
    eprintln!("  {}", info.summary());
    eprintln!("  environment: {}", environment);
}
