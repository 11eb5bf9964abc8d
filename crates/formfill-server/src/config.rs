//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Directory of `.docx` templates handed to every populator run.
    pub templates_dir: PathBuf,
    /// Where populated forms are published for download.
    pub output_dir: PathBuf,
    /// The `formfill` binary, invoked as `<bin> populate <data> <templates> <out>`.
    pub populator_bin: PathBuf,
    /// Upper bound on one populator run.
    pub timeout: Duration,
}
