use serde::{Deserialize, Serialize};

use crate::model::reference::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAgePolicy {
    KeepFirst,
    KeepLast,
}

/// Tunable constants of the engine. None of these carry a clinical derivation;
/// they are heuristics kept out of the algorithms so a deployment can override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Upper bound of the assessable age window (days).
    pub max_age_days: u32,
    /// Z-scores saturate at +/- this value.
    pub z_saturation: f64,
    pub percentile_floor: f64,
    pub percentile_ceiling: f64,
    /// Projected weight gain (kg/day) when Z > 0.
    pub growth_rate_above_median: f64,
    /// Projected weight gain (kg/day) when Z <= 0.
    pub growth_rate_at_or_below_median: f64,
    pub stable_channel_z: f64,
    pub high_confidence_z: f64,
    pub severe_alert_z: f64,
    pub worsening_z_drop: f64,
    pub trend_stable_band: f64,
    pub duplicate_age_policy: DuplicateAgePolicy,
    pub required_genders: Vec<Gender>,
}

impl EngineParams {
    pub fn default_v1() -> Self {
        Self {
            max_age_days: 1856,
            z_saturation: 10.0,
            percentile_floor: 0.01,
            percentile_ceiling: 99.99,
            growth_rate_above_median: 0.015,
            growth_rate_at_or_below_median: 0.012,
            stable_channel_z: 2.0,
            high_confidence_z: 1.0,
            severe_alert_z: -3.0,
            worsening_z_drop: 1.0,
            trend_stable_band: 0.5,
            duplicate_age_policy: DuplicateAgePolicy::KeepFirst,
            required_genders: vec![Gender::Male, Gender::Female],
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::default_v1()
    }
}
