mod audio;
mod cli;
mod config;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

use audio::features::{TempoEstimate, TempoReport};
use cli::Cli;
use config::AnalysisConfig;

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    #[serde(flatten)]
    report: &'a TempoReport,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect bpmscan.toml / global config
    let config_path = cli.config.clone().or_else(find_config);
    let mut analysis = AnalysisConfig::default();
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.window_size == 1024 { cli.window_size = cfg.analysis.window_size; }
            if cli.hop_size == 512 { cli.hop_size = cfg.analysis.hop_size; }
            if cli.sensitivity == 1.5 { cli.sensitivity = cfg.analysis.sensitivity; }
            if cli.min_bpm == 60 { cli.min_bpm = cfg.analysis.min_bpm; }
            if cli.max_bpm == 200 { cli.max_bpm = cfg.analysis.max_bpm; }
            analysis = cfg.analysis;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    analysis.window_size = cli.window_size;
    analysis.hop_size = cli.hop_size;
    analysis.sensitivity = cli.sensitivity;
    analysis.min_bpm = cli.min_bpm;
    analysis.max_bpm = cli.max_bpm;

    // Sample rate is not known yet; check everything else up front.
    analysis
        .validate(1)
        .context("Invalid analysis configuration")?;

    log::info!("bpmscan - onset based tempo estimation");
    log::info!(
        "Window: {} samples, hop: {} samples, sensitivity: {:.2}, range: {}-{} BPM",
        analysis.window_size, analysis.hop_size, analysis.sensitivity, analysis.min_bpm, analysis.max_bpm
    );

    let pb = if cli.inputs.len() > 1 {
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut failed = 0usize;
    for input in &cli.inputs {
        let output = match process_file(input, &analysis) {
            Ok(report) => render(input, &report, &cli)?,
            Err(err) => {
                failed += 1;
                log::error!("{}: {:#}", input.display(), err);
                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                continue;
            }
        };
        match pb {
            Some(ref pb) => {
                pb.println(output);
                pb.inc(1);
            }
            None => println!("{}", output),
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Analysis complete");
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be analyzed", failed, cli.inputs.len());
    }
    Ok(())
}

fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("bpmscan.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("bpmscan").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("bpmscan").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

fn process_file(input: &Path, analysis: &AnalysisConfig) -> Result<TempoReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    log::info!("Input: {}", input.display());

    log::info!("Decoding audio...");
    let audio = audio::decode::decode_to_mono(input)?;
    if audio.channels > 1 {
        log::debug!("Mixed {} channels down to mono", audio.channels);
    }

    log::info!("Analyzing tempo...");
    let report = audio::analysis::analyze(&audio.samples, audio.sample_rate, analysis)
        .with_context(|| format!("Cannot analyze {}", input.display()))?;
    Ok(report)
}

fn render(input: &Path, report: &TempoReport, cli: &Cli) -> Result<String> {
    if cli.json {
        let file_report = FileReport {
            file: input.display().to_string(),
            report,
        };
        // One object per line so batch output stays line-delimited JSON
        return Ok(serde_json::to_string(&file_report)?);
    }

    if cli.quiet {
        return Ok(match report.estimate.bpm() {
            Some(bpm) => bpm.to_string(),
            None => "undetermined".to_string(),
        });
    }

    let mut lines = vec![
        format!("{}", input.display()),
        format!(
            "  Duration: {:.1}s @ {}Hz, {} analysis frames",
            report.duration, report.sample_rate, report.frame_count
        ),
        format!(
            "  Energy: mean {:.6}, std dev {:.6}, max {:.6}, threshold {:.6}",
            report.energy.mean, report.energy.std_dev, report.energy.max, report.energy.threshold
        ),
        format!("  Onsets: {}", report.onset_count),
    ];
    if let Some(median) = report.intervals.median_interval_secs {
        lines.push(format!(
            "  Median interval: {:.4}s ({} of {} intervals used)",
            median, report.intervals.valid_intervals, report.intervals.total_intervals
        ));
    }
    lines.push(match report.estimate {
        TempoEstimate::Determined { bpm } => format!("  Estimated BPM: {}", bpm),
        TempoEstimate::Undetermined(reason) => format!("  Could not determine BPM ({})", reason),
    });
    Ok(lines.join("\n"))
}
