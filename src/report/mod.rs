use std::collections::BTreeMap;

use serde::Serialize;

use crate::pipeline::stage1_build::BuildReport;
use crate::pipeline::stage7_trend::TrendDirection;

pub mod json;
pub mod text;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
    pub git_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub source: String,
    pub snapshot_version: u64,
    pub charts: Vec<String>,
    pub accepted_rows: usize,
    pub dropped_rows: usize,
    pub duplicate_ages: usize,
}

impl ReferenceSummary {
    pub fn new(source: String, snapshot_version: u64, charts: Vec<String>, report: &BuildReport) -> Self {
        Self {
            source,
            snapshot_version,
            charts,
            accepted_rows: report.accepted,
            dropped_rows: report.dropped,
            duplicate_ages: report.duplicates,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartStats {
    pub chart: String,
    pub n_assessed: usize,
    pub n_unassessable: usize,
    pub z_median: Option<f64>,
    pub z_p10: Option<f64>,
    pub z_p90: Option<f64>,
    pub classifications: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub chart: String,
    pub direction: TrendDirection,
    pub latest_z: Option<f64>,
    pub delta_z: Option<f64>,
    pub alerts: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub gender: String,
    pub n_visits: usize,
    pub latest_status: String,
    pub trends: Vec<TrendSummary>,
    pub projected_weight: Option<f64>,
    pub projection_confidence: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: ToolMeta,
    pub reference: ReferenceSummary,
    pub n_patients: usize,
    pub n_visits: usize,
    pub charts: Vec<ChartStats>,
    pub statuses: BTreeMap<String, usize>,
    pub alerts: BTreeMap<String, usize>,
    pub patients: Vec<PatientSummary>,
}

pub fn format_opt_2(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}", v),
        None => "NA".to_string(),
    }
}

pub fn quantile_indexed(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    Some(sorted[idx])
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.5)
}

pub fn p10(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.10)
}

pub fn p90(values: &[f64]) -> Option<f64> {
    quantile_indexed(values, 0.90)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
