use crate::config::AnalysisConfig;
use crate::error::ConfigError;

use super::energy::frame_energies;
use super::features::{TempoEstimate, TempoReport};
use super::onset::{detect_onsets, energy_stats};
use super::tempo::estimate_tempo;

/// Runs the tempo pipeline over a complete mono signal:
/// frame energies, adaptive-threshold onsets, then the inter-onset tempo.
///
/// Fails only when `config` is unusable for `sample_rate`; short, silent or
/// beatless input yields [`TempoEstimate::Undetermined`].
pub fn analyze(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> Result<TempoReport, ConfigError> {
    config.validate(sample_rate)?;
    let duration = samples.len() as f64 / sample_rate as f64;

    log::info!(
        "Pass 1: Frame energy (window={}, hop={})...",
        config.window_size, config.hop_size
    );
    let energies = frame_energies(samples, config.window_size, config.hop_size);
    log::info!("Analysis frames: {}", energies.len());

    log::info!("Pass 2: Onset detection (k={:.2})...", config.sensitivity);
    let stats = energy_stats(&energies, config.sensitivity);
    log::info!(
        "Energy stats: mean={:.6}, std_dev={:.6}, max={:.6}, threshold={:.6}",
        stats.mean, stats.std_dev, stats.max, stats.threshold
    );
    let min_distance_frames = config.min_distance_frames(sample_rate);
    log::debug!("Refractory period: {} frames", min_distance_frames);
    let onsets = detect_onsets(
        &energies,
        stats.threshold,
        config.neighborhood_radius,
        min_distance_frames,
    );
    log::info!("Found {} onsets", onsets.len());

    log::info!("Pass 3: Tempo estimation...");
    let (intervals, estimate) = estimate_tempo(&onsets, sample_rate, config);
    if let Some(median) = intervals.median_interval_secs {
        log::info!(
            "Median interval: {:.4}s over {}/{} valid intervals",
            median, intervals.valid_intervals, intervals.total_intervals
        );
    }
    match estimate {
        TempoEstimate::Determined { bpm } => log::info!("Tempo: {} BPM", bpm),
        TempoEstimate::Undetermined(reason) => log::warn!("Tempo undetermined: {}", reason),
    }

    Ok(TempoReport {
        sample_rate,
        total_samples: samples.len(),
        duration,
        frame_count: energies.len(),
        energy: stats,
        min_distance_frames,
        onset_count: onsets.len(),
        onsets,
        intervals,
        estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::UndeterminedReason;

    /// Short decaying bursts every `60 / bpm` seconds over a faint noise floor.
    fn click_track(bpm: f64, sample_rate: u32, seconds: f64) -> Vec<f32> {
        let total = (sample_rate as f64 * seconds) as usize;
        let period = (60.0 / bpm * sample_rate as f64).round() as usize;
        let click_len = sample_rate as usize / 200;
        let mut samples = vec![0.0f32; total];
        for (i, s) in samples.iter_mut().enumerate() {
            let pos = i % period;
            *s = if pos < click_len {
                let t = pos as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * (-t * 400.0).exp()
            } else {
                0.001 * ((i * 7919 % 101) as f32 / 101.0 - 0.5)
            };
        }
        samples
    }

    /// Frame-aligned config: 0.01 s hop so beat periods fall on whole frames.
    fn aligned_config() -> AnalysisConfig {
        AnalysisConfig {
            window_size: 882,
            hop_size: 441,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn silence_is_undetermined() {
        for len in [1024, 1536, 44100 * 5] {
            let report = analyze(&vec![0.0; len], 44100, &AnalysisConfig::default()).unwrap();
            assert_eq!(report.onset_count, 0);
            assert_eq!(report.energy.std_dev, 0.0);
            assert!(matches!(
                report.estimate,
                TempoEstimate::Undetermined(UndeterminedReason::TooFewOnsets { found: 0, .. })
            ));
        }
    }

    #[test]
    fn too_short_input_is_undetermined() {
        let report = analyze(&[0.3; 100], 44100, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.frame_count, 0);
        assert_eq!(report.estimate.bpm(), None);

        let report = analyze(&[], 44100, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.frame_count, 0);
        assert_eq!(report.duration, 0.0);
    }

    #[test]
    fn periodic_clicks_give_exact_tempo() {
        for bpm in [75.0, 100.0, 120.0, 150.0] {
            let samples = click_track(bpm, 44100, 10.0);
            let report = analyze(&samples, 44100, &aligned_config()).unwrap();
            assert!(report.onset_count >= 5, "{} BPM: {} onsets", bpm, report.onset_count);
            assert_eq!(report.estimate.bpm(), Some(bpm as u32));
        }
    }

    #[test]
    fn default_config_on_click_track() {
        let samples = click_track(128.0, 44100, 20.0);
        let report = analyze(&samples, 44100, &AnalysisConfig::default()).unwrap();
        let bpm = report.estimate.bpm().expect("tempo should be determined");
        assert!((bpm as i64 - 128).abs() <= 3, "expected ~128, got {}", bpm);
    }

    #[test]
    fn fast_clicks_fold_into_band() {
        // 300 BPM = 0.2 s spacing, folded once
        let samples = click_track(300.0, 44100, 8.0);
        let report = analyze(&samples, 44100, &aligned_config()).unwrap();
        assert_eq!(report.intervals.raw_bpm, Some(300));
        assert_eq!(report.estimate.bpm(), Some(150));
    }

    #[test]
    fn onsets_are_at_least_50ms_apart() {
        // dense bursts with a noisy floor so the detector sees many close peaks
        let samples: Vec<f32> = (0..44100 * 4)
            .map(|i| {
                let burst = if i % 1500 < 200 { 0.5 } else { 0.02 };
                burst * ((i * 7919 % 211) as f32 / 211.0 - 0.5)
            })
            .collect();
        for hop in [64, 128, 256, 512] {
            let config = AnalysisConfig {
                window_size: hop * 2,
                hop_size: hop,
                sensitivity: 0.0,
                ..AnalysisConfig::default()
            };
            let report = analyze(&samples, 44100, &config).unwrap();
            assert!(report.onsets.len() > 1, "hop {}: {} onsets", hop, report.onsets.len());
            assert_eq!(report.onsets.len(), report.onset_count);
            for w in report.onsets.windows(2) {
                let gap = (w[1] - w[0]) as f64 * hop as f64 / 44100.0;
                assert!(gap >= 0.05, "hop {}: onsets {} and {} are {:.4}s apart", hop, w[0], w[1], gap);
            }
        }
    }

    #[test]
    fn non_finite_sample_yields_no_onsets() {
        let mut samples = click_track(120.0, 44100, 10.0);
        let clean = analyze(&samples, 44100, &aligned_config()).unwrap();
        assert!(clean.energy.threshold.is_finite());
        assert!(clean.onset_count > 0);

        samples[220_500] = f32::NAN;
        let report = analyze(&samples, 44100, &aligned_config()).unwrap();
        assert!(report.energy.threshold.is_nan());
        assert!(report.onsets.is_empty());
        assert!(matches!(
            report.estimate,
            TempoEstimate::Undetermined(UndeterminedReason::TooFewOnsets { found: 0, .. })
        ));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let samples = click_track(110.0, 44100, 8.0);
        let config = AnalysisConfig::default();
        let a = analyze(&samples, 44100, &config).unwrap();
        let b = analyze(&samples, 44100, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_config_fails_fast() {
        let config = AnalysisConfig { window_size: 256, hop_size: 512, ..AnalysisConfig::default() };
        assert!(analyze(&[0.0; 4096], 44100, &config).is_err());
        assert_eq!(
            analyze(&[0.0; 4096], 0, &AnalysisConfig::default()),
            Err(ConfigError::ZeroSampleRate)
        );
    }
}
