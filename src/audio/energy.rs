use rayon::prelude::*;

/// Number of full frames that fit, `floor((N - W) / H)`, or zero when the
/// signal is shorter than one window.
pub fn frame_count(num_samples: usize, window_size: usize, hop_size: usize) -> usize {
    if hop_size == 0 || num_samples < window_size {
        return 0;
    }
    (num_samples - window_size) / hop_size
}

/// Mean squared amplitude of one window.
pub fn frame_energy(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f64 = frame.iter().map(|&s| s as f64 * s as f64).sum();
    sum / frame.len() as f64
}

/// Per-frame energy, frame `i` covering `samples[i * hop .. i * hop + window]`.
///
/// Frames are computed in parallel; `collect` keeps them in index order.
pub fn frame_energies(samples: &[f32], window_size: usize, hop_size: usize) -> Vec<f64> {
    let frames = frame_count(samples.len(), window_size, hop_size);
    (0..frames)
        .into_par_iter()
        .map(|i| {
            let start = i * hop_size;
            frame_energy(&samples[start..start + window_size])
        })
        .collect()
}
