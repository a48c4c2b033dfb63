use crate::model::{Gender, ReferencePoint};
use crate::pipeline::stage2_resolve::{Resolution, resolve_point};
use crate::reference::ReferenceTable;

/// The reference point actually used for a computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPoint {
    pub point: ReferencePoint,
    pub exact_match: bool,
    pub interpolated: bool,
}

pub fn progress(lower_age: u32, upper_age: u32, target_age: u32) -> f64 {
    if upper_age == lower_age {
        return 0.0;
    }
    (target_age as f64 - lower_age as f64) / (upper_age as f64 - lower_age as f64)
}

fn lerp(lower: f64, upper: f64, t: f64) -> f64 {
    lower + (upper - lower) * t
}

fn lerp_opt(lower: Option<f64>, upper: Option<f64>, t: f64) -> Option<f64> {
    Some(lerp(lower?, upper?, t))
}

/// Synthetic point at `target_age`, blended linearly between the bracketing samples.
pub fn interpolate(lower: &ReferencePoint, upper: &ReferencePoint, target_age: u32) -> ReferencePoint {
    let t = progress(lower.age_days, upper.age_days, target_age);
    ReferencePoint {
        age_days: target_age,
        gender: lower.gender,
        l: lerp(lower.l, upper.l, t),
        m: lerp(lower.m, upper.m, t),
        s: lerp(lower.s, upper.s, t),
        sd0: lerp(lower.sd0, upper.sd0, t),
        sd1neg: lerp(lower.sd1neg, upper.sd1neg, t),
        sd1pos: lerp(lower.sd1pos, upper.sd1pos, t),
        sd2neg: lerp(lower.sd2neg, upper.sd2neg, t),
        sd2pos: lerp(lower.sd2pos, upper.sd2pos, t),
        sd3neg: lerp(lower.sd3neg, upper.sd3neg, t),
        sd3pos: lerp(lower.sd3pos, upper.sd3pos, t),
        sd4neg: lerp_opt(lower.sd4neg, upper.sd4neg, t),
        sd4pos: lerp_opt(lower.sd4pos, upper.sd4pos, t),
    }
}

/// Resolve and, when bracketed, interpolate. `None` means no coverage.
pub fn reference_at(table: &ReferenceTable, gender: Gender, age_days: u32) -> Option<ResolvedPoint> {
    match resolve_point(table, gender, age_days) {
        Resolution::NoData => None,
        Resolution::Exact(p) => Some(ResolvedPoint {
            point: *p,
            exact_match: true,
            interpolated: false,
        }),
        Resolution::Clamped(p) => Some(ResolvedPoint {
            point: *p,
            exact_match: false,
            interpolated: false,
        }),
        Resolution::Bracket { lower, upper } => Some(ResolvedPoint {
            point: interpolate(lower, upper, age_days),
            exact_match: false,
            interpolated: true,
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_interpolate.rs"]
mod tests;
