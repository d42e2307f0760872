//! NutriTrack backend
//!
//! An MCP server for nutrition goals and food lookup.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use nutritrack::build_info;
use nutritrack::config::Config;
use nutritrack::db::{self, Database};
use nutritrack::mcp::NutriTrackService;
use nutritrack::store::SqliteDocumentStore;
use nutritrack::tools::status::StatusTracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutritrack=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    build_info::print_startup_banner(config.environment.as_str());

    let verifier = config.identity_verifier()?;

    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    eprintln!("Initializing database...");
    let database = Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| -> db::DbResult<()> {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let store = Arc::new(SqliteDocumentStore::new(database));
    let status = StatusTracker::new(db_path, config.environment.as_str());
    let service = NutriTrackService::new(status, store, verifier);

    eprintln!("Starting MCP server on stdio...");
    let server = service.serve((stdin(), stdout())).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
