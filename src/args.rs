use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Serve a web game export with cross-origin isolation enabled.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Directory the exported game lives in
    #[arg(short, long, default_value = ".")]
    pub serve_dir: PathBuf,

    /// How long a connection may sit idle while reading or writing (0s to wait forever)
    #[arg(short, long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}
