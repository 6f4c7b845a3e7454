pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "podvault")]
#[command(about = "Keep typed documents in a Solid pod and share read access to them")]
pub struct Args {
    /// Path to the podvault config directory (defaults to ~/.podvault)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: crate::Command,
}
