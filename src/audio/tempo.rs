use crate::config::AnalysisConfig;

use super::features::{IntervalSummary, TempoEstimate, UndeterminedReason};

/// Upper bound on doublings/halvings; a `u32` tempo cannot need more.
const MAX_FOLDS: u32 = 32;

/// Seconds between consecutive onsets.
pub fn inter_onset_intervals(onsets: &[usize], hop_size: usize, sample_rate: u32) -> Vec<f64> {
    onsets
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 * hop_size as f64 / sample_rate as f64)
        .collect()
}

/// Median of `values`, taking the upper middle element for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

/// Doubles a tempo below `min_bpm` and halves one above `max_bpm` until it
/// lands in `[min_bpm, max_bpm]`. Returns `None` for zero or when no fold
/// lands inside the band.
pub fn fold_octaves(bpm: u32, min_bpm: u32, max_bpm: u32) -> Option<u32> {
    let mut bpm = bpm;
    let mut folds = 0;
    while bpm > 0 && bpm < min_bpm && folds < MAX_FOLDS {
        bpm = bpm.saturating_mul(2);
        folds += 1;
    }
    while bpm > max_bpm && folds < MAX_FOLDS {
        bpm /= 2;
        folds += 1;
    }
    if folds > 0 {
        log::debug!("Folded tempo {} times to {} BPM", folds, bpm);
    }
    (min_bpm..=max_bpm).contains(&bpm).then_some(bpm)
}

/// Turns onset frame indices into a tempo.
pub fn estimate_tempo(
    onsets: &[usize],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> (IntervalSummary, TempoEstimate) {
    let mut summary = IntervalSummary {
        total_intervals: onsets.len().saturating_sub(1),
        valid_intervals: 0,
        median_interval_secs: None,
        raw_bpm: None,
    };

    if onsets.len() < config.min_onsets {
        let reason = UndeterminedReason::TooFewOnsets {
            found: onsets.len(),
            required: config.min_onsets,
        };
        return (summary, TempoEstimate::Undetermined(reason));
    }

    let plausible: Vec<f64> = inter_onset_intervals(onsets, config.hop_size, sample_rate)
        .into_iter()
        .filter(|&i| i >= config.min_interval_secs && i <= config.max_interval_secs)
        .collect();
    summary.valid_intervals = plausible.len();

    if plausible.len() < config.min_valid_intervals {
        let reason = UndeterminedReason::TooFewIntervals {
            valid: plausible.len(),
            required: config.min_valid_intervals,
        };
        return (summary, TempoEstimate::Undetermined(reason));
    }

    let Some(median_interval) = median(&plausible) else {
        let reason = UndeterminedReason::TooFewIntervals {
            valid: 0,
            required: config.min_valid_intervals,
        };
        return (summary, TempoEstimate::Undetermined(reason));
    };
    summary.median_interval_secs = Some(median_interval);

    let raw_bpm = (60.0 / median_interval).round() as u32;
    summary.raw_bpm = Some(raw_bpm);

    let estimate = match fold_octaves(raw_bpm, config.min_bpm, config.max_bpm) {
        Some(bpm) => TempoEstimate::Determined { bpm },
        None => TempoEstimate::Undetermined(UndeterminedReason::OutOfRange { raw_bpm }),
    };
    (summary, estimate)
}
