//! Mapping spectra onto a fixed-width display curve.
//!
//! Pure functions, no drawing: a renderer copies a spectrum out of
//! [`SpectrumState`](crate::SpectrumState), maps it to one value per pixel
//! column with [`render_curve`], and draws bars or a path from the result.
//! Columns are spaced logarithmically in frequency, values are dB mapped onto
//! `0..=1`.

use serde::{Deserialize, Serialize};

/// Highest usable floor. Floors above this, and NaN, are pulled down to it.
pub const MAX_FLOOR_DB: f32 = -1.0;

/// Curve mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayParams {
    /// Level mapped to 0.0, in dB, at most [`MAX_FLOOR_DB`] (default: -100.0)
    pub floor_db: f32,
    /// Magnitude treated as 0 dB; `None` means `2 * num_bins` (default: None)
    pub reference_scale: Option<f32>,
    /// Lowest bin shown at the left edge (default: 1.0)
    pub min_bin: f32,
    /// Weight of the previous column in the left-to-right smoothing, `0..1` (default: 0.5)
    pub smoothing: f32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            floor_db: -100.0,
            reference_scale: None,
            min_bin: 1.0,
            smoothing: 0.5,
        }
    }
}

/// Map `normalized` in `0..=1` onto `min..=max` logarithmically.
pub fn normalized_to_log_range(normalized: f32, min: f32, max: f32) -> f32 {
    let value = (normalized * (max / min).ln()).exp() * min;
    value.clamp(min, max)
}

/// Map one magnitude onto `0..=1`: `floor_db` and below is 0, the reference
/// scale is 1.
pub fn relative_level(magnitude: f32, reference_scale: f32, floor_db: f32) -> f32 {
    let floor_db = floor_db.min(MAX_FLOOR_DB);
    let gain = magnitude / reference_scale;
    let db = if gain > 0.0 {
        (20.0 * gain.log10()).max(floor_db)
    } else {
        floor_db
    };
    (db / -floor_db + 1.0).clamp(0.0, 1.0)
}

/// Fill `out` with one smoothed level per column.
///
/// Each column reads the spectrum at a log-spaced fractional bin and
/// interpolates linearly between neighbours. Does not allocate.
pub fn render_curve(spectrum: &[f32], out: &mut [f32], params: &DisplayParams) {
    let num_bins = spectrum.len();
    if num_bins == 0 {
        out.fill(0.0);
        return;
    }

    let reference = params
        .reference_scale
        .unwrap_or(2.0 * num_bins as f32);
    let level = |bin: usize| relative_level(spectrum[bin], reference, params.floor_db);

    let min_bin = params.min_bin.clamp(1.0, num_bins as f32);
    let smoothing = params.smoothing.clamp(0.0, 1.0);
    let width = out.len();
    let mut previous = level(0);

    for (column, value) in out.iter_mut().enumerate() {
        let position = column as f32 / width as f32;
        let bin_position = normalized_to_log_range(position, min_bin, num_bins as f32);

        let bin = (bin_position.floor() as usize).min(num_bins - 1);
        let next = (bin + 1).min(num_bins - 1);
        let fraction = bin_position - bin as f32;

        let lower = level(bin);
        let upper = level(next);
        let interpolated = lower + fraction.clamp(0.0, 1.0) * (upper - lower);

        previous = smoothing * previous + (1.0 - smoothing) * interpolated;
        *value = previous;
    }
}
