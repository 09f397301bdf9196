use crate::error::AnalyticsError;

/// Intensity assumed for a set logged without RPE.
///
/// Sets missing effort data are scored as if performed at RPE 7, which biases
/// load upward for easy unlogged sets and downward for hard ones.
pub const DEFAULT_INTENSITY: f64 = 70.0;

/// Epley estimate of the one-rep max.
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> Result<f64, AnalyticsError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(AnalyticsError::invalid_input(format!(
            "weight must be a non-negative number, got {}",
            weight
        )));
    }
    match reps {
        0 => Err(AnalyticsError::invalid_input(
            "reps must be at least 1 to estimate a one-rep max",
        )),
        1 => Ok(weight),
        reps => Ok(weight * (1.0 + f64::from(reps) / 30.0)),
    }
}

/// Maps RPE 0-10 onto a 0-100 intensity, falling back to `default_intensity`
/// (normally [`DEFAULT_INTENSITY`]) when no RPE was logged.
pub fn intensity_from_rpe(rpe: Option<f64>, default_intensity: f64) -> f64 {
    match rpe {
        Some(value) => value.clamp(0.0, 10.0) * 10.0,
        None => default_intensity,
    }
}
