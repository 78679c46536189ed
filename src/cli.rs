use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bpmscan", about = "Estimate the tempo of audio files")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG, AAC)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (defaults to ./bpmscan.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analysis window size in samples
    #[arg(long, default_value_t = 1024)]
    pub window_size: usize,

    /// Hop between analysis windows in samples
    #[arg(long, default_value_t = 512)]
    pub hop_size: usize,

    /// Onset threshold multiplier (lower = more onsets)
    #[arg(short, long, default_value_t = 1.5)]
    pub sensitivity: f64,

    /// Lower bound of the reported tempo range
    #[arg(long, default_value_t = 60)]
    pub min_bpm: u32,

    /// Upper bound of the reported tempo range
    #[arg(long, default_value_t = 200)]
    pub max_bpm: u32,

    /// Print one JSON report per input
    #[arg(long)]
    pub json: bool,

    /// Print only the tempo
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,
}
