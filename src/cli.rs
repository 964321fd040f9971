//! CLI entry
//!
//! Argument parsing, configuration loading, the startup connection check,
//! and server launch. CLI flags override their environment counterparts.

use std::sync::Arc;

use clap::Parser;

use crate::config::Config;
use crate::http::HttpServer;
use crate::observability::logger;
use crate::store::{MongoStore, RecordStore};

#[derive(Debug, Parser)]
#[command(name = "rollcall", version, about = "Student and course records API")]
pub struct Args {
    /// Host to bind to (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Static front-end directory (overrides STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<std::path::PathBuf>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = dir;
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = Config::from_env()?;
    args.apply(&mut config);

    let store = Arc::new(MongoStore::new(
        config.mongodb_uri.clone(),
        config.database.clone(),
    ));

    // A failed first connection is fatal at startup; once the process is
    // serving, connection failures degrade to per-request 503s instead.
    if let Err(e) = store.ready().await {
        logger::error("STARTUP_CONNECT_FAILED", &[("detail", &e.to_string())]);
        return Err(Box::new(e));
    }

    logger::info(
        "SERVER_STARTING",
        &[
            ("addr", &config.socket_addr()),
            ("environment", &config.environment),
            ("database", &config.database),
        ],
    );

    HttpServer::new(&config, store).start().await?;
    Ok(())
}
