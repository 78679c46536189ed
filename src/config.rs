use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Parameters for one tempo analysis run. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Samples per analysis frame
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Samples between consecutive frame starts
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    /// Threshold multiplier k in `mean + k * std_dev`
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Frames on each side an onset must strictly exceed
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius: usize,
    /// Refractory period between accepted onsets, in seconds
    #[serde(default = "default_min_onset_spacing_secs")]
    pub min_onset_spacing_secs: f64,
    #[serde(default = "default_min_onsets")]
    pub min_onsets: usize,
    #[serde(default = "default_min_valid_intervals")]
    pub min_valid_intervals: usize,
    /// Plausible inter-onset interval band, in seconds
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: f64,
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: f64,
    /// Canonical tempo band results are folded into
    #[serde(default = "default_min_bpm")]
    pub min_bpm: u32,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            hop_size: default_hop_size(),
            sensitivity: default_sensitivity(),
            neighborhood_radius: default_neighborhood_radius(),
            min_onset_spacing_secs: default_min_onset_spacing_secs(),
            min_onsets: default_min_onsets(),
            min_valid_intervals: default_min_valid_intervals(),
            min_interval_secs: default_min_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
        }
    }
}

fn default_window_size() -> usize { 1024 }
fn default_hop_size() -> usize { 512 }
fn default_sensitivity() -> f64 { 1.5 }
fn default_neighborhood_radius() -> usize { 2 }
fn default_min_onset_spacing_secs() -> f64 { 0.05 }
fn default_min_onsets() -> usize { 4 }
fn default_min_valid_intervals() -> usize { 3 }
fn default_min_interval_secs() -> f64 { 0.2 }
fn default_max_interval_secs() -> f64 { 2.0 }
fn default_min_bpm() -> u32 { 60 }
fn default_max_bpm() -> u32 { 200 }

impl AnalysisConfig {
    /// Checks the parameters against the given sample rate.
    pub fn validate(&self, sample_rate: u32) -> Result<(), ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.hop_size == 0 {
            return Err(ConfigError::ZeroHopSize);
        }
        if self.window_size <= self.hop_size {
            return Err(ConfigError::WindowNotLargerThanHop {
                window: self.window_size,
                hop: self.hop_size,
            });
        }
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(ConfigError::InvalidSensitivity(self.sensitivity));
        }
        if self.neighborhood_radius == 0 {
            return Err(ConfigError::ZeroNeighborhood);
        }
        if !self.min_onset_spacing_secs.is_finite() || self.min_onset_spacing_secs < 0.0 {
            return Err(ConfigError::InvalidOnsetSpacing(self.min_onset_spacing_secs));
        }
        if self.min_onsets < 2 {
            return Err(ConfigError::MinimumTooSmall {
                what: "onsets",
                required: 2,
                got: self.min_onsets,
            });
        }
        if self.min_valid_intervals < 1 {
            return Err(ConfigError::MinimumTooSmall {
                what: "valid intervals",
                required: 1,
                got: self.min_valid_intervals,
            });
        }
        let (lo, hi) = (self.min_interval_secs, self.max_interval_secs);
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
            return Err(ConfigError::InvalidIntervalBand { min: lo, max: hi });
        }
        if self.min_bpm == 0 || self.max_bpm < self.min_bpm.saturating_mul(2) {
            return Err(ConfigError::InvalidBpmBand {
                min: self.min_bpm,
                max: self.max_bpm,
            });
        }
        Ok(())
    }

    /// Refractory period expressed in frames, rounded up.
    pub fn min_distance_frames(&self, sample_rate: u32) -> usize {
        (self.min_onset_spacing_secs * sample_rate as f64 / self.hop_size as f64).ceil() as usize
    }
}

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("Cannot read {}: {}", path.display(), err);
            return None;
        }
    };
    match parse_config(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate(44100).is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config("[analysis]\nhop_size = 256\nmax_bpm = 180\n").unwrap();
        assert_eq!(cfg.analysis.hop_size, 256);
        assert_eq!(cfg.analysis.max_bpm, 180);
        assert_eq!(cfg.analysis.window_size, 1024);
        assert_eq!(cfg.analysis.min_onsets, 4);
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.analysis, AnalysisConfig::default());
    }

    #[test]
    fn malformed_toml_reports_offending_key() {
        let err = parse_config("[analysis]\nhop_size = \"fast\"\n").unwrap_err();
        assert!(err.to_string().contains("hop_size"), "{}", err);
    }

    #[test]
    fn unreadable_or_malformed_file_is_none() {
        assert!(load_config(&PathBuf::from("/nonexistent/bpmscan.toml")).is_none());

        let path = std::env::temp_dir().join(format!("bpmscan-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[analysis\nwindow_size = 2048\n").unwrap();
        let loaded = load_config(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn rejects_contract_violations() {
        let base = AnalysisConfig::default();
        assert_eq!(base.validate(0), Err(ConfigError::ZeroSampleRate));

        let cfg = AnalysisConfig { hop_size: 0, ..base.clone() };
        assert_eq!(cfg.validate(44100), Err(ConfigError::ZeroHopSize));

        let cfg = AnalysisConfig { window_size: 512, ..base.clone() };
        assert!(matches!(
            cfg.validate(44100),
            Err(ConfigError::WindowNotLargerThanHop { window: 512, hop: 512 })
        ));

        let cfg = AnalysisConfig { sensitivity: f64::NAN, ..base.clone() };
        assert!(matches!(cfg.validate(44100), Err(ConfigError::InvalidSensitivity(_))));

        let cfg = AnalysisConfig { min_onsets: 1, ..base.clone() };
        assert!(matches!(cfg.validate(44100), Err(ConfigError::MinimumTooSmall { .. })));

        let cfg = AnalysisConfig { min_interval_secs: 3.0, ..base.clone() };
        assert!(matches!(cfg.validate(44100), Err(ConfigError::InvalidIntervalBand { .. })));

        let cfg = AnalysisConfig { min_bpm: 120, max_bpm: 200, ..base };
        assert!(matches!(cfg.validate(44100), Err(ConfigError::InvalidBpmBand { .. })));
    }

    #[test]
    fn refractory_frames_round_up() {
        let cfg = AnalysisConfig::default();
        // 0.05 * 44100 / 512 = 4.306...
        assert_eq!(cfg.min_distance_frames(44100), 5);
        // 0.05 * 48000 / 480 = 5 exactly
        let cfg = AnalysisConfig { window_size: 960, hop_size: 480, ..cfg };
        assert_eq!(cfg.min_distance_frames(48000), 5);
    }
}
