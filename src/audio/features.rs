use serde::Serialize;
use std::fmt;

/// Summary statistics of an energy sequence and the threshold derived from them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EnergyStats {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub max: f64,
    /// `mean + k * std_dev`
    pub threshold: f64,
}

/// Why no tempo could be reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UndeterminedReason {
    TooFewOnsets { found: usize, required: usize },
    TooFewIntervals { valid: usize, required: usize },
    /// The raw tempo could not be folded into the canonical band
    OutOfRange { raw_bpm: u32 },
}

impl fmt::Display for UndeterminedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewOnsets { found, required } => {
                write!(f, "too few onsets: found {}, need {}", found, required)
            }
            Self::TooFewIntervals { valid, required } => {
                write!(f, "too few valid intervals: found {}, need {}", valid, required)
            }
            Self::OutOfRange { raw_bpm } => {
                write!(f, "tempo {} BPM cannot be folded into range", raw_bpm)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TempoEstimate {
    Determined { bpm: u32 },
    Undetermined(UndeterminedReason),
}

impl TempoEstimate {
    pub fn bpm(&self) -> Option<u32> {
        match self {
            Self::Determined { bpm } => Some(*bpm),
            Self::Undetermined(_) => None,
        }
    }
}

/// Intermediate values from the tempo estimator
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntervalSummary {
    pub total_intervals: usize,
    pub valid_intervals: usize,
    pub median_interval_secs: Option<f64>,
    /// `round(60 / median)` before octave folding
    pub raw_bpm: Option<u32>,
}

/// Full outcome of one analysis run: the estimate plus observational diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TempoReport {
    pub sample_rate: u32,
    pub total_samples: usize,
    pub duration: f64,
    pub frame_count: usize,
    pub energy: EnergyStats,
    pub min_distance_frames: usize,
    pub onset_count: usize,
    /// Frame indices of accepted onsets
    pub onsets: Vec<usize>,
    pub intervals: IntervalSummary,
    pub estimate: TempoEstimate,
}
