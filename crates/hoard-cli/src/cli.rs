use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Hoard: a content-addressable blob store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Client configuration file.
    #[arg(long, global = true, default_value = "hoard.toml")]
    pub config: PathBuf,

    /// Print sizes next to refs and log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a signing key and write the client configuration
    Init(InitArgs),
    /// Upload raw files as blobs
    Blob(PathsArgs),
    /// Upload files, symlinks and directories with their schema objects
    File(PathsArgs),
    /// Create a signed permanode
    Permanode,
    /// Create a signed share granting access to a blob
    Share(ShareArgs),
    /// Serve blobs over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct PathsArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ShareArgs {
    /// Blob the share grants access to.
    pub target: String,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub transitive: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Server configuration file. Defaults apply when omitted.
    #[arg(long)]
    pub server_config: Option<PathBuf>,
    /// Override the listen address.
    #[arg(long)]
    pub bind: Option<String>,
}
