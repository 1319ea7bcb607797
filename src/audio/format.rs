//! Label and progress helpers shared by both player variants.

/// Formats a position in seconds as `MM:SS`.
///
/// Seconds are rounded to the nearest whole second before splitting, so
/// `59.6` renders as `01:00`. Anything that is not a finite, non-negative
/// number renders as `00:00`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Waveform fill for `current` against `total`, in `[0, 100]`.
///
/// Returns `None` while the total is unknown so callers cannot render a
/// percentage for an unresolved track.
pub fn progress_percent(current: f64, total: Option<f64>) -> Option<f64> {
    let total = total.filter(|t| t.is_finite() && *t > 0.0)?;
    if !current.is_finite() {
        return Some(0.0);
    }
    Some((current / total * 100.0).clamp(0.0, 100.0))
}

/// Clamps a seek target into `[0, total]`. `None` for NaN targets.
pub(crate) fn clamp_position(target: f64, total: f64) -> Option<f64> {
    if target.is_nan() {
        return None;
    }
    Some(target.clamp(0.0, total))
}
