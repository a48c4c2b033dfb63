use chrono::NaiveDate;
use serde::Serialize;

use crate::model::alerts::alert_order;
use crate::model::{
    AlertKind, ChartType, EngineParams, GrowthAlert, GrowthAssessment, Measurement, Severity,
};

pub const DAYS_PER_MONTH: f64 = 30.4375;

/// A measurement paired with its assessment. Series must be ordered by age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedPoint {
    pub age_days: i64,
    pub date: Option<NaiveDate>,
    pub value: f64,
    pub assessment: GrowthAssessment,
}

pub fn pair_series(measurements: &[Measurement], assessments: Vec<GrowthAssessment>) -> Vec<AssessedPoint> {
    measurements
        .iter()
        .zip(assessments)
        .map(|(m, assessment)| AssessedPoint {
            age_days: m.age_days,
            date: m.date,
            value: m.value,
            assessment,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocitySegment {
    pub from_index: usize,
    pub to_index: usize,
    pub days: i64,
    pub value_per_day: f64,
    pub value_per_month: f64,
    pub z_per_month: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
    InsufficientData,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

/// Latest assessable measurement against the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub previous_index: usize,
    pub latest_index: usize,
    pub days_between: i64,
    pub delta_value: f64,
    pub delta_z: f64,
    pub delta_percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub chart: ChartType,
    pub assessable: usize,
    pub velocities: Vec<VelocitySegment>,
    pub direction: TrendDirection,
    pub comparison: Option<Comparison>,
    pub alerts: Vec<GrowthAlert>,
}

fn assessable(points: &[AssessedPoint]) -> Vec<(usize, &AssessedPoint, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.assessment.z_score.map(|z| (i, p, z)))
        .collect()
}

pub fn velocities(points: &[AssessedPoint]) -> Vec<VelocitySegment> {
    let valid = assessable(points);
    let mut out = Vec::with_capacity(valid.len().saturating_sub(1));
    for pair in valid.windows(2) {
        let (i0, p0, z0) = pair[0];
        let (i1, p1, z1) = pair[1];
        let days = p1.age_days - p0.age_days;
        if days <= 0 {
            continue;
        }
        let per_day = (p1.value - p0.value) / days as f64;
        out.push(VelocitySegment {
            from_index: i0,
            to_index: i1,
            days,
            value_per_day: per_day,
            value_per_month: per_day * DAYS_PER_MONTH,
            z_per_month: (z1 - z0) / days as f64 * DAYS_PER_MONTH,
        });
    }
    out
}

pub fn trend_direction(points: &[AssessedPoint], params: &EngineParams) -> TrendDirection {
    let valid = assessable(points);
    let (Some(first), Some(last)) = (valid.first(), valid.last()) else {
        return TrendDirection::InsufficientData;
    };
    if valid.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let delta = last.2 - first.2;
    if delta > params.trend_stable_band {
        TrendDirection::Increasing
    } else if delta < -params.trend_stable_band {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

pub fn compare_latest(points: &[AssessedPoint]) -> Option<Comparison> {
    let valid = assessable(points);
    let [.., (i0, p0, z0), (i1, p1, z1)] = valid.as_slice() else {
        return None;
    };
    Some(Comparison {
        previous_index: *i0,
        latest_index: *i1,
        days_between: p1.age_days - p0.age_days,
        delta_value: p1.value - p0.value,
        delta_z: z1 - z0,
        delta_percentile: match (p0.assessment.percentile, p1.assessment.percentile) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        },
    })
}

/// Severe, crossing and worsening alerts; every alert is also logged at warn level.
pub fn collect_alerts(chart: ChartType, points: &[AssessedPoint], params: &EngineParams) -> Vec<GrowthAlert> {
    let mut alerts = Vec::new();
    if !chart.is_deficit_chart() {
        return alerts;
    }
    let valid = assessable(points);
    let channel_floor = -params.stable_channel_z;

    for (pos, &(idx, point, z)) in valid.iter().enumerate() {
        let mut push = |kind: AlertKind, message: String| {
            alerts.push(GrowthAlert {
                kind,
                chart,
                index: idx,
                age_days: point.age_days,
                z_score: z,
                message,
            });
        };
        if z < params.severe_alert_z {
            push(
                AlertKind::SevereDeviation,
                format!("{} Z-score {z:.2} below {:.1}", chart.as_str(), params.severe_alert_z),
            );
        }
        let Some(&(_, prev_point, prev_z)) = pos.checked_sub(1).and_then(|p| valid.get(p)) else {
            continue;
        };
        if prev_z >= channel_floor && z < channel_floor {
            push(
                AlertKind::ChannelCrossing,
                format!(
                    "{} Z-score fell from {prev_z:.2} to {z:.2}, crossing {channel_floor:.1}",
                    chart.as_str()
                ),
            );
        }
        if prev_z - z >= params.worsening_z_drop {
            push(
                AlertKind::Worsening,
                format!(
                    "{} Z-score dropped {:.2} over {} days",
                    chart.as_str(),
                    prev_z - z,
                    point.age_days - prev_point.age_days
                ),
            );
        }
    }

    let rank = |k: AlertKind| alert_order().iter().position(|o| *o == k).unwrap_or(usize::MAX);
    alerts.sort_by_key(|a| (a.index, rank(a.kind)));
    for alert in &alerts {
        tracing::warn!(
            kind = alert.kind.as_str(),
            age_days = alert.age_days,
            z = alert.z_score,
            "{}",
            alert.message
        );
    }
    alerts
}

pub fn analyze_trend(chart: ChartType, points: &[AssessedPoint], params: &EngineParams) -> TrendReport {
    TrendReport {
        chart,
        assessable: points.iter().filter(|p| p.assessment.is_assessable()).count(),
        velocities: velocities(points),
        direction: trend_direction(points, params),
        comparison: compare_latest(points),
        alerts: collect_alerts(chart, points, params),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightProjection {
    pub predicted_weight: f64,
    pub confidence: Confidence,
    /// False when the current weight was returned unchanged.
    pub projected: bool,
}

/// Linear weight projection, only inside the stable channel. Outside it, or without
/// a Z-score or a future target age, the current weight is returned with low confidence.
pub fn project_weight(
    assessment: &GrowthAssessment,
    current_weight: f64,
    current_age_days: i64,
    target_age_days: i64,
    params: &EngineParams,
) -> WeightProjection {
    let hold = WeightProjection {
        predicted_weight: current_weight,
        confidence: Confidence::Low,
        projected: false,
    };
    let Some(z) = assessment.z_score else {
        return hold;
    };
    let channel = params.stable_channel_z;
    if !(-channel..=channel).contains(&z) || target_age_days <= current_age_days {
        return hold;
    }

    let rate = if z > 0.0 {
        params.growth_rate_above_median
    } else {
        params.growth_rate_at_or_below_median
    };
    let days = (target_age_days - current_age_days) as f64;
    let confidence = if assessment.severity == Severity::Severe {
        Confidence::Low
    } else if (-params.high_confidence_z..=params.high_confidence_z).contains(&z) {
        Confidence::High
    } else {
        Confidence::Medium
    };
    WeightProjection {
        predicted_weight: current_weight + rate * days,
        confidence,
        projected: true,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_trend.rs"]
mod tests;
