//! Processing-time estimation.
//!
//! Reporting only: the estimate is shown to users while their video is
//! processing and has no effect on control flow.

/// Tuning constant for the estimate, calibrated against observed
/// processing times.
pub const DEFAULT_ESTIMATE_K: f64 = 0.033;

/// Floor for any estimate, in seconds.
const MIN_ESTIMATE_SECS: u64 = 30;

/// Estimate how long external processing will take, in seconds.
///
/// Scales linearly with duration and with frame height relative to 240p.
pub fn estimated_processing_secs(duration_secs: u32, height: u32, k: f64) -> u64 {
    let height_factor = f64::from(height.max(240)) / 240.0;
    let estimate = f64::from(duration_secs) * k * height_factor;
    (estimate.ceil() as u64).max(MIN_ESTIMATE_SECS)
}
