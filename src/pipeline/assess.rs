use serde::Serialize;

use crate::model::{
    ChartType, EngineParams, Gender, GrowthAssessment, GrowthStatus, Measurement, ReferenceValues,
    Visit, ZScoreResult,
};
use crate::pipeline::stage3_interpolate::reference_at;
use crate::pipeline::stage4_zscore::{Lms, compute_zscore, validate_measurement};
use crate::pipeline::stage5_percentile::z_to_percentile;
use crate::pipeline::stage6_classify::{
    Classification, GrowthZScores, NO_COVERAGE, UNASSESSABLE, classify_chart_zscore, classify_growth,
};
use crate::reference::{ReferenceSet, ReferenceTable};

/// Z-score and percentile of one measured value against one chart.
pub fn compute_zscore_result(
    table: &ReferenceTable,
    gender: Gender,
    age_days: i64,
    value: f64,
    params: &EngineParams,
) -> ZScoreResult {
    let age = match validate_measurement(value, age_days, params) {
        Ok(age) => age,
        Err(err) => {
            tracing::debug!(chart = table.chart().as_str(), %err, "measurement not assessable");
            return ZScoreResult::absent(UNASSESSABLE.label);
        }
    };

    let Some(resolved) = reference_at(table, gender, age) else {
        return ZScoreResult::absent(NO_COVERAGE.label);
    };

    let p = &resolved.point;
    let lms = Lms {
        l: p.l,
        m: p.m,
        s: p.s,
    };
    match compute_zscore(value, age_days, lms, params) {
        Ok(z) => ZScoreResult {
            z_score: Some(z),
            percentile: Some(z_to_percentile(z, params)),
            classification: classify_chart_zscore(table.chart(), Some(z)).label.to_string(),
            exact_match: resolved.exact_match,
            interpolated: resolved.interpolated,
            reference_values: Some(ReferenceValues::from(p)),
        },
        Err(err) => {
            tracing::debug!(chart = table.chart().as_str(), %err, "z-score not computed");
            ZScoreResult::absent(UNASSESSABLE.label)
        }
    }
}

fn to_assessment(chart: ChartType, result: ZScoreResult) -> GrowthAssessment {
    let class: Classification = match result.z_score {
        Some(z) => classify_chart_zscore(chart, Some(z)),
        None if result.classification == NO_COVERAGE.label => NO_COVERAGE,
        None => UNASSESSABLE,
    };
    GrowthAssessment {
        z_score: result.z_score,
        percentile: result.percentile,
        classification: class.label.to_string(),
        severity: class.severity,
        recommendation: class.recommendation.to_string(),
        interpolated: result.interpolated,
        reference_values: result.reference_values,
    }
}

pub fn assess(
    table: &ReferenceTable,
    gender: Gender,
    age_days: i64,
    value: f64,
    params: &EngineParams,
) -> GrowthAssessment {
    to_assessment(table.chart(), compute_zscore_result(table, gender, age_days, value, params))
}

/// One assessment per measurement, in input order. Bad entries become "Unable to assess".
pub fn assess_series(
    table: &ReferenceTable,
    gender: Gender,
    measurements: &[Measurement],
    params: &EngineParams,
) -> Vec<GrowthAssessment> {
    measurements
        .iter()
        .map(|m| assess(table, gender, m.age_days, m.value, params))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartAssessment {
    pub chart: ChartType,
    pub value: f64,
    pub assessment: GrowthAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitAssessment {
    pub patient_id: String,
    pub age_days: i64,
    pub charts: Vec<ChartAssessment>,
    pub status: GrowthStatus,
}

impl VisitAssessment {
    pub fn chart(&self, chart: ChartType) -> Option<&ChartAssessment> {
        self.charts.iter().find(|c| c.chart == chart)
    }

    pub fn z(&self, chart: ChartType) -> Option<f64> {
        self.chart(chart).and_then(|c| c.assessment.z_score)
    }
}

const VISIT_CHARTS: [ChartType; 4] = [
    ChartType::WeightForAge,
    ChartType::HeightForAge,
    ChartType::HeadCircumferenceForAge,
    ChartType::BmiForAge,
];

/// Assess every recorded value of a visit against the charts available in `set`.
pub fn assess_visit(set: &ReferenceSet, visit: &Visit, params: &EngineParams) -> VisitAssessment {
    let mut charts = Vec::new();
    for chart in VISIT_CHARTS {
        let Some(value) = visit.value_for(chart) else {
            continue;
        };
        let assessment = match set.get(chart) {
            Some(table) => assess(table, visit.gender, visit.age_days, value, params),
            None => to_assessment(chart, ZScoreResult::absent(NO_COVERAGE.label)),
        };
        charts.push(ChartAssessment {
            chart,
            value,
            assessment,
        });
    }

    let mut out = VisitAssessment {
        patient_id: visit.patient_id.clone(),
        age_days: visit.age_days,
        charts,
        status: GrowthStatus::Unknown,
    };
    out.status = classify_growth(&GrowthZScores {
        weight_for_age: out.z(ChartType::WeightForAge),
        height_for_age: out.z(ChartType::HeightForAge),
        bmi_for_age: out.z(ChartType::BmiForAge),
    });
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/assess.rs"]
mod tests;
