use serde::Serialize;

use crate::model::reference::ChartType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    SevereDeviation,
    ChannelCrossing,
    Worsening,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::SevereDeviation => "SEVERE_DEVIATION",
            AlertKind::ChannelCrossing => "CHANNEL_CROSSING",
            AlertKind::Worsening => "WORSENING",
        }
    }
}

pub fn alert_order() -> &'static [AlertKind] {
    &[
        AlertKind::SevereDeviation,
        AlertKind::ChannelCrossing,
        AlertKind::Worsening,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthAlert {
    pub kind: AlertKind,
    pub chart: ChartType,
    /// Index into the assessed series that triggered the alert.
    pub index: usize,
    pub age_days: i64,
    pub z_score: f64,
    pub message: String,
}
