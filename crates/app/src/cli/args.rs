pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blobview")]
#[command(about = "Inspect encrypted content-addressed blob trees")]
pub struct Args {
    /// Path to a TOML config file, overridden by command line flags
    #[arg(long, global = true, env = "BLOBVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
