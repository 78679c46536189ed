use thiserror::Error;

/// Rejected analysis parameters. These are caller mistakes, checked once
/// before any frame is processed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("hop size must be positive")]
    ZeroHopSize,
    #[error("window size ({window}) must be larger than hop size ({hop})")]
    WindowNotLargerThanHop { window: usize, hop: usize },
    #[error("sensitivity must be a finite non-negative number, got {0}")]
    InvalidSensitivity(f64),
    #[error("neighborhood radius must be at least 1")]
    ZeroNeighborhood,
    #[error("minimum onset spacing must be a finite non-negative number of seconds, got {0}")]
    InvalidOnsetSpacing(f64),
    #[error("at least {required} {what} are required, got {got}")]
    MinimumTooSmall {
        what: &'static str,
        required: usize,
        got: usize,
    },
    #[error("interval band {min}s..{max}s is empty or not positive")]
    InvalidIntervalBand { min: f64, max: f64 },
    #[error("BPM band {min}..{max} cannot hold a folded tempo (max must be at least twice min)")]
    InvalidBpmBand { min: u32, max: u32 },
}
