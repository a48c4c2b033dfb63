pub mod assess;
pub mod stage1_build;
pub mod stage2_resolve;
pub mod stage3_interpolate;
pub mod stage4_zscore;
pub mod stage5_percentile;
pub mod stage6_classify;
pub mod stage7_trend;
pub mod stage8_report;

use serde::Serialize;

use crate::model::{ChartType, EngineParams, Gender, Visit};
use crate::pipeline::assess::{VisitAssessment, assess_visit};
use crate::pipeline::stage7_trend::{AssessedPoint, TrendReport, WeightProjection, analyze_trend, project_weight};
use crate::reference::ReferenceSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub from_age_days: i64,
    pub target_age_days: i64,
    pub current_weight: f64,
    #[serde(flatten)]
    pub projection: WeightProjection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientResult {
    pub patient_id: String,
    pub gender: Gender,
    pub visits: Vec<Visit>,
    pub assessments: Vec<VisitAssessment>,
    pub trends: Vec<TrendReport>,
    pub projection: Option<ProjectionResult>,
}

const TREND_CHARTS: [ChartType; 4] = [
    ChartType::WeightForAge,
    ChartType::HeightForAge,
    ChartType::HeadCircumferenceForAge,
    ChartType::BmiForAge,
];

/// Assess one patient's visits (already ordered by age), derive per-chart trends,
/// and optionally project the latest weight forward by `project_ahead_days`.
pub fn analyze_patient(
    set: &ReferenceSet,
    visits: Vec<Visit>,
    params: &EngineParams,
    project_ahead_days: Option<i64>,
) -> Option<PatientResult> {
    let first = visits.first()?;
    let patient_id = first.patient_id.clone();
    let gender = first.gender;

    let assessments: Vec<VisitAssessment> = visits.iter().map(|v| assess_visit(set, v, params)).collect();

    let mut trends = Vec::new();
    for chart in TREND_CHARTS {
        let series: Vec<AssessedPoint> = visits
            .iter()
            .zip(&assessments)
            .filter_map(|(visit, va)| {
                let ca = va.chart(chart)?;
                Some(AssessedPoint {
                    age_days: visit.age_days,
                    date: visit.date,
                    value: ca.value,
                    assessment: ca.assessment.clone(),
                })
            })
            .collect();
        if series.is_empty() {
            continue;
        }
        trends.push(analyze_trend(chart, &series, params));
    }

    let projection = project_ahead_days.and_then(|ahead| {
        let (visit, ca) = visits
            .iter()
            .zip(&assessments)
            .rev()
            .find_map(|(v, va)| va.chart(ChartType::WeightForAge).map(|ca| (v, ca)))?;
        let target = visit.age_days + ahead;
        Some(ProjectionResult {
            from_age_days: visit.age_days,
            target_age_days: target,
            current_weight: ca.value,
            projection: project_weight(&ca.assessment, ca.value, visit.age_days, target, params),
        })
    });

    Some(PatientResult {
        patient_id,
        gender,
        visits,
        assessments,
        trends,
        projection,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
