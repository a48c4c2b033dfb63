use serde::Deserialize;

/// A loosely-typed cell as delivered by a reference data source.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawValue {
    pub fn text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(trimmed.to_string())
        }
    }

    /// Finite numeric value, parsing text when needed.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Missing => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::text(value)
    }
}

/// One unvalidated reference row.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RawReferenceRow {
    #[serde(alias = "sex")]
    pub gender: RawValue,
    #[serde(alias = "chart")]
    pub chart_type: RawValue,
    #[serde(alias = "age", alias = "day")]
    pub age_days: RawValue,
    #[serde(alias = "L")]
    pub l: RawValue,
    #[serde(alias = "M")]
    pub m: RawValue,
    #[serde(alias = "S")]
    pub s: RawValue,
    #[serde(alias = "SD0")]
    pub sd0: RawValue,
    #[serde(alias = "SD1neg")]
    pub sd1neg: RawValue,
    #[serde(alias = "SD1", alias = "sd1")]
    pub sd1pos: RawValue,
    #[serde(alias = "SD2neg")]
    pub sd2neg: RawValue,
    #[serde(alias = "SD2", alias = "sd2")]
    pub sd2pos: RawValue,
    #[serde(alias = "SD3neg")]
    pub sd3neg: RawValue,
    #[serde(alias = "SD3", alias = "sd3")]
    pub sd3pos: RawValue,
    #[serde(alias = "SD4neg")]
    pub sd4neg: RawValue,
    #[serde(alias = "SD4", alias = "sd4")]
    pub sd4pos: RawValue,
}
