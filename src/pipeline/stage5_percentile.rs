use crate::model::EngineParams;
use crate::pipeline::stage4_zscore::round2;

// Abramowitz & Stegun 7.1.26
const P: f64 = 0.327_591_1;
const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;

/// Standard normal CDF, in percent, unclamped and unrounded.
pub fn normal_cdf_percent(z: f64) -> f64 {
    let x = z.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let erf = 1.0 - poly * (-x * x).exp();
    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    50.0 * (1.0 + sign * erf)
}

pub fn z_to_percentile(z: f64, params: &EngineParams) -> f64 {
    let p = normal_cdf_percent(z).clamp(params.percentile_floor, params.percentile_ceiling);
    round2(p).clamp(params.percentile_floor, params.percentile_ceiling)
}

/// Z-score whose percentile is `percentile`, found by bisection on the same CDF
/// so both directions agree. `None` outside the open interval (0, 100).
pub fn percentile_to_z(percentile: f64, params: &EngineParams) -> Option<f64> {
    if !(percentile > 0.0 && percentile < 100.0) {
        return None;
    }
    let mut lo = -params.z_saturation;
    let mut hi = params.z_saturation;
    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        if normal_cdf_percent(mid) < percentile {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(round2(0.5 * (lo + hi)))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_percentile.rs"]
mod tests;
