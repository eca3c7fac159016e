use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photoreel")]
#[command(author, version, about = "Incremental HLS slideshows from a folder of screenshots")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build or update the album, re-encoding only changed segments
    Run {
        /// Directory containing the photos
        #[arg(required = true)]
        input: PathBuf,

        /// Directory receiving frames, media units and playlists
        #[arg(required = true)]
        output: PathBuf,

        /// File name prefix of the manifest, blocks and resume cache
        #[arg(long)]
        prefix: Option<String>,

        /// Path inside the input directory whose modification time marks changes
        #[arg(long)]
        freshness_marker: Option<PathBuf>,

        /// Number of segments processed concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// Ignore the freshness token and run change detection anyway
        #[arg(long)]
        force: bool,

        /// Show what would be rebuilt without rendering or writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the metadata embedded in a photo
    Meta {
        /// PNG file to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the index records of a manifest or resume cache
    Manifest {
        /// Manifest (.m3u8) or resume cache (.index)
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
