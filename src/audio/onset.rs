use super::features::EnergyStats;

/// Mean, population standard deviation and maximum of `energies`, with the
/// adaptive threshold `mean + sensitivity * std_dev`.
pub fn energy_stats(energies: &[f64], sensitivity: f64) -> EnergyStats {
    if energies.is_empty() {
        return EnergyStats::default();
    }
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let variance = (energies.iter().map(|&e| (e - mean) * (e - mean)).sum::<f64>() / n).max(0.0);
    let std_dev = variance.sqrt();
    let max = energies.iter().copied().fold(0.0f64, f64::max);

    EnergyStats {
        mean,
        std_dev,
        max,
        threshold: mean + sensitivity * std_dev,
    }
}

/// Frame indices of detected onsets, in increasing order.
///
/// A frame qualifies when its energy is above `threshold` and strictly above
/// every frame within `radius` on both sides. Frames closer than `radius` to
/// either end are skipped. After an onset is accepted, frames less than
/// `min_distance` later are ignored.
pub fn detect_onsets(energies: &[f64], threshold: f64, radius: usize, min_distance: usize) -> Vec<usize> {
    let mut onsets = Vec::new();
    if radius == 0 || energies.len() <= 2 * radius {
        return onsets;
    }

    let mut last_onset: Option<usize> = None;
    for i in radius..energies.len() - radius {
        let e = energies[i];
        // Comparisons against NaN are false, so a non-finite threshold rejects every frame.
        let above_threshold = e > threshold;
        let rested = last_onset.map_or(true, |last| i - last >= min_distance);
        if above_threshold && rested && (1..=radius).all(|d| e > energies[i - d] && e > energies[i + d]) {
            onsets.push(i);
            last_onset = Some(i);
        }
    }

    onsets
}
