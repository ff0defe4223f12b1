// seqpress-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use seqpress_core::config::{
    DEFAULT_ACCELERATOR, DEFAULT_BITRATE_MODIFIER, DEFAULT_CODEC, DEFAULT_MBITS_MAX, DEFAULT_RATIO_MAX,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "seqpress: Multi-clip camera recording converter",
    long_about = "Groups camera clips into recording sequences and converts each sequence into one file using ffmpeg via seqpress-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Organizes clips into sequences and converts each sequence into one output file
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Directory containing the camera clips; outputs are written here
    #[arg(short = 'v', long = "videos", required = true, value_name = "DIR")]
    pub videos_dir: PathBuf,

    /// Output codec (h265 or h264)
    #[arg(short, long, default_value = DEFAULT_CODEC, value_name = "CODEC")]
    pub codec: String,

    /// Encoding accelerator (qsv or cpu)
    #[arg(short, long, default_value = DEFAULT_ACCELERATOR, value_name = "ACCEL")]
    pub accelerator: String,

    /// Copy the streams losslessly instead of re-encoding
    #[arg(short = 'C', long, default_value_t = false)]
    pub no_convert: bool,

    /// Absolute bitrate ceiling in megabits
    #[arg(long, default_value_t = DEFAULT_MBITS_MAX, value_name = "MBITS")]
    pub mbits_max: u32,

    /// Bitrate ceiling as a fraction of the source bitrate
    #[arg(long, default_value_t = DEFAULT_RATIO_MAX, value_name = "RATIO")]
    pub ratio_max: f64,

    /// Multiplier for resolutions without a tuned bitrate
    #[arg(long, default_value_t = DEFAULT_BITRATE_MODIFIER, value_name = "FACTOR")]
    pub bitrate_modifier: f64,

    /// Skip sequences whose output file already exists
    #[arg(short, long, default_value_t = false)]
    pub resume: bool,

    /// Use the existing sequence subdirectories instead of organizing clips
    #[arg(long, default_value_t = false)]
    pub skip_organize: bool,

    /// Optional: Directory for concat list files (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Optional: Directory for log files (defaults to VIDEOS/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}
