use thiserror::Error;

use crate::model::EngineParams;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidMeasurement {
    #[error("measured value {0} is not positive")]
    NonPositiveValue(f64),
    #[error("measured value is not a finite number")]
    NonFiniteValue,
    #[error("age {age_days} days is outside 0..={max_age_days}")]
    AgeOutOfRange { age_days: i64, max_age_days: u32 },
    #[error("LMS parameters invalid (M and S must be positive and finite)")]
    InvalidLms,
}

/// LMS parameters of one reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lms {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Check value and age before any lookup; returns the age as an index into the tables.
pub fn validate_measurement(
    value: f64,
    age_days: i64,
    params: &EngineParams,
) -> Result<u32, InvalidMeasurement> {
    if !value.is_finite() {
        return Err(InvalidMeasurement::NonFiniteValue);
    }
    if value <= 0.0 {
        return Err(InvalidMeasurement::NonPositiveValue(value));
    }
    if age_days < 0 || age_days > params.max_age_days as i64 {
        return Err(InvalidMeasurement::AgeOutOfRange {
            age_days,
            max_age_days: params.max_age_days,
        });
    }
    Ok(age_days as u32)
}

/// Raw LMS transform without saturation or rounding.
pub fn lms_z(value: f64, lms: Lms) -> f64 {
    if lms.l == 0.0 {
        (value / lms.m).ln() / lms.s
    } else {
        ((value / lms.m).powf(lms.l) - 1.0) / (lms.l * lms.s)
    }
}

/// LMS Z-score, saturated to +/- `params.z_saturation` and rounded to 2 decimals.
pub fn compute_zscore(
    value: f64,
    age_days: i64,
    lms: Lms,
    params: &EngineParams,
) -> Result<f64, InvalidMeasurement> {
    validate_measurement(value, age_days, params)?;
    if !(lms.m > 0.0 && lms.s > 0.0 && lms.l.is_finite() && lms.m.is_finite() && lms.s.is_finite()) {
        return Err(InvalidMeasurement::InvalidLms);
    }

    let z = lms_z(value, lms);
    let limit = params.z_saturation;
    let z = if z.is_finite() {
        z.clamp(-limit, limit)
    } else if value > lms.m {
        limit
    } else {
        -limit
    };
    Ok(round2(z))
}

/// Measurement value at a given Z on the curve; inverse of [`lms_z`].
pub fn value_at_z(z: f64, lms: Lms) -> Option<f64> {
    let v = if lms.l == 0.0 {
        lms.m * (lms.s * z).exp()
    } else {
        let base = 1.0 + lms.l * lms.s * z;
        if base <= 0.0 {
            return None;
        }
        lms.m * base.powf(1.0 / lms.l)
    };
    v.is_finite().then_some(v)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_zscore.rs"]
mod tests;
