use std::path::PathBuf;
use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

use bugtrack::{
    BugStore, DurableLogger, InMemoryBugStore, PostgresBugStore, create_bug_router,
    route_not_found,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "Path to the operation log for durable audit records")]
    oplog: Option<String>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(optional, "PostgreSQL database URL; omit to use in-memory storage")]
    database_url: Option<String>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

const HELP_TEXT: &str = r#"bugtrackd - bug tracking daemon

USAGE:
    bugtrackd [OPTIONS]

OPTIONS:
    --oplog <PATH>          Path to the operation log [default: bugtrack.jsonl]
    --host <HOST>           Host to bind the HTTP server [default: 127.0.0.1]
    --port <PORT>           Port to bind the HTTP server [default: 5000]
    --database-url <URL>    PostgreSQL database URL; omit for in-memory storage
    --verbose               Enable verbose logging

DESCRIPTION:
    Runs the bug tracking daemon with record endpoints mounted under /api/

    The server supports graceful shutdown via SIGTERM or Ctrl+C.

API ENDPOINTS:
    GET    /api/health       Health check
    GET    /api/bugs         List all bugs, newest first
    POST   /api/bugs         Create a bug
    GET    /api/bugs/{id}    Get a specific bug
    PUT    /api/bugs/{id}    Partially update a bug
    DELETE /api/bugs/{id}    Delete a bug"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: bugtrackd [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let config = ServerConfig::from_args(args);

    if config.verbose {
        println!("bugtrackd starting with configuration:");
        println!("  Operation log: {}", config.oplog_path.display());
        println!("  Bind address: {}:{}", config.host, config.port);
        match &config.database_url {
            Some(url) => println!("  Storage: PostgreSQL at {}", url),
            None => println!("  Storage: in-memory"),
        }
    }

    let logger = Arc::new(DurableLogger::new(config.oplog_path.clone()));
    let store: Arc<dyn BugStore> = match &config.database_url {
        Some(url) => Arc::new(
            PostgresBugStore::connect(url)
                .await
                .map_err(|e| format!("Failed to connect to database: {}", e))?,
        ),
        None => Arc::new(InMemoryBugStore::new()),
    };

    let app = Router::new()
        .nest("/api", create_bug_router(logger, store))
        .fallback(route_not_found);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("bugtrackd listening on http://{}", addr);
    println!("Operation log: {}", config.oplog_path.display());
    println!("Use Ctrl+C or send SIGTERM for graceful shutdown");

    let shutdown_signal = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        () = shutdown_signal => {
            println!();
            println!("Shutdown signal received, stopping server gracefully...");
            println!("bugtrackd stopped");
        }
    }

    Ok(())
}

struct ServerConfig {
    oplog_path: PathBuf,
    host: String,
    port: u16,
    database_url: Option<String>,
    verbose: bool,
}

impl ServerConfig {
    fn from_args(args: Args) -> Self {
        Self {
            oplog_path: args
                .oplog
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("bugtrack.jsonl")),
            host: args.host.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: args.port.unwrap_or(5000),
            database_url: args.database_url,
            verbose: args.verbose,
        }
    }
}
