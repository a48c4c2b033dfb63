use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" | "male" | "boy" | "1" => Some(Gender::Male),
            "f" | "female" | "girl" | "2" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    WeightForAge,
    HeightForAge,
    HeadCircumferenceForAge,
    BmiForAge,
}

impl ChartType {
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "wfa" | "weightforage" => Some(ChartType::WeightForAge),
            "hfa" | "lfa" | "lhfa" | "heightforage" | "lengthforage" | "lengthheightforage" => {
                Some(ChartType::HeightForAge)
            }
            "hcfa" | "headcircumferenceforage" | "headforage" => {
                Some(ChartType::HeadCircumferenceForAge)
            }
            "bfa" | "bmifa" | "bmiforage" => Some(ChartType::BmiForAge),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::WeightForAge => "weight-for-age",
            ChartType::HeightForAge => "height-for-age",
            ChartType::HeadCircumferenceForAge => "head-circumference-for-age",
            ChartType::BmiForAge => "bmi-for-age",
        }
    }

    /// Charts whose severe deficits raise a severe-deviation alert.
    pub fn is_deficit_chart(self) -> bool {
        matches!(self, ChartType::WeightForAge | ChartType::HeightForAge)
    }
}

/// One sample of an LMS reference curve.
///
/// `sd*` lines are carried for display and QA; the Z-score only uses `l`, `m`, `s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub age_days: u32,
    pub gender: Gender,
    pub l: f64,
    pub m: f64,
    pub s: f64,
    pub sd0: f64,
    pub sd1neg: f64,
    pub sd1pos: f64,
    pub sd2neg: f64,
    pub sd2pos: f64,
    pub sd3neg: f64,
    pub sd3pos: f64,
    pub sd4neg: Option<f64>,
    pub sd4pos: Option<f64>,
}
