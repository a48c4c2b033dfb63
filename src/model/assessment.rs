use serde::Serialize;

use crate::model::reference::ReferencePoint;

pub const NO_REFERENCE_DATA: &str = "No reference data available";
pub const UNABLE_TO_ASSESS: &str = "Unable to assess";

/// Reference measurement values at the median and SD lines of the point used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceValues {
    pub median: f64,
    pub sd1neg: f64,
    pub sd1pos: f64,
    pub sd2neg: f64,
    pub sd2pos: f64,
    pub sd3neg: f64,
    pub sd3pos: f64,
}

impl From<&ReferencePoint> for ReferenceValues {
    fn from(p: &ReferencePoint) -> Self {
        Self {
            median: p.sd0,
            sd1neg: p.sd1neg,
            sd1pos: p.sd1pos,
            sd2neg: p.sd2neg,
            sd2pos: p.sd2pos,
            sd3neg: p.sd3neg,
            sd3pos: p.sd3pos,
        }
    }
}

/// Raw outcome of one Z-score computation. `z_score == None` never means normal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreResult {
    pub z_score: Option<f64>,
    pub percentile: Option<f64>,
    pub classification: String,
    pub exact_match: bool,
    pub interpolated: bool,
    pub reference_values: Option<ReferenceValues>,
}

impl ZScoreResult {
    pub fn absent(classification: &str) -> Self {
        Self {
            z_score: None,
            percentile: None,
            classification: classification.to_string(),
            exact_match: false,
            interpolated: false,
            reference_values: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthAssessment {
    pub z_score: Option<f64>,
    pub percentile: Option<f64>,
    pub classification: String,
    pub severity: Severity,
    pub recommendation: String,
    pub interpolated: bool,
    pub reference_values: Option<ReferenceValues>,
}

impl GrowthAssessment {
    pub fn is_assessable(&self) -> bool {
        self.z_score.is_some()
    }
}

/// Combined status across weight, height and BMI Z-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrowthStatus {
    Obese,
    Overweight,
    Underweight,
    Stunted,
    Normal,
    Unknown,
}

impl GrowthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthStatus::Obese => "OBESE",
            GrowthStatus::Overweight => "OVERWEIGHT",
            GrowthStatus::Underweight => "UNDERWEIGHT",
            GrowthStatus::Stunted => "STUNTED",
            GrowthStatus::Normal => "NORMAL",
            GrowthStatus::Unknown => "UNKNOWN",
        }
    }
}
