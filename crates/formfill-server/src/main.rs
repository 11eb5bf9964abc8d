//! `formfill-server`: accepts applicant data over HTTP, runs the `formfill`
//! populator and serves the filled forms.
//!
//! ```bash
//! formfill-server --templates-dir templates --output-dir output --bind 0.0.0.0:5000
//! ```

mod config;
mod error;
mod jobs;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(name = "formfill-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP front end for the formfill populator", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "FORMFILL_BIND", default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Directory of .docx templates
    #[arg(long = "templates-dir", env = "FORMFILL_TEMPLATES_DIR", default_value = "templates")]
    templates_dir: PathBuf,

    /// Directory populated forms are published to
    #[arg(long = "output-dir", env = "FORMFILL_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Populator binary
    #[arg(long = "populator", env = "FORMFILL_POPULATOR_BIN", default_value = "formfill")]
    populator_bin: PathBuf,

    /// Seconds one populator run may take
    #[arg(long = "timeout-secs", env = "FORMFILL_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        bind: cli.bind,
        templates_dir: cli.templates_dir,
        output_dir: cli.output_dir,
        populator_bin: cli.populator_bin,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    server::run_server(config).await
}
