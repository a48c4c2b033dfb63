use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::ChartType;
use crate::pipeline::PatientResult;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{
    ChartStats, PatientSummary, ReferenceSummary, SummaryData, ToolMeta, TrendSummary, format_opt_2,
    median, p10, p90,
};

#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub tool: ToolMeta,
    pub reference: ReferenceSummary,
    pub patients: &'a [PatientResult],
}

pub fn write_reports(input: &ReportInput<'_>, out_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    write_assessments_tsv(input.patients, &out_dir.join("assessments.tsv"))?;
    write_alerts_tsv(input.patients, &out_dir.join("alerts.tsv"))?;

    let summary = build_summary(input);
    let json = render_summary_json(&summary).map_err(std::io::Error::other)?;
    write_text(&out_dir.join("summary.json"), &json)?;
    write_text(&out_dir.join("report.txt"), &render_report_text(&summary))?;

    tracing::info!(out = %out_dir.display(), patients = input.patients.len(), "reports written");
    Ok(())
}

fn write_assessments_tsv(patients: &[PatientResult], path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "patient_id",
        "sex",
        "date",
        "age_days",
        "chart",
        "value",
        "z_score",
        "percentile",
        "classification",
        "severity",
        "interpolated",
        "visit_status",
        "recommendation",
    ];
    writeln!(w, "{}", header.join("\t"))?;
    for patient in patients {
        for (visit, va) in patient.visits.iter().zip(&patient.assessments) {
            let date = visit.date.map(|d| d.to_string()).unwrap_or_default();
            for ca in &va.charts {
                let a = &ca.assessment;
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}\t{:.3}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    patient.patient_id,
                    patient.gender.as_str(),
                    date,
                    visit.age_days,
                    ca.chart.as_str(),
                    ca.value,
                    format_opt_2(a.z_score),
                    format_opt_2(a.percentile),
                    a.classification,
                    a.severity.as_str(),
                    a.interpolated,
                    va.status.as_str(),
                    a.recommendation
                )?;
            }
        }
    }
    w.flush()
}

fn write_alerts_tsv(patients: &[PatientResult], path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "patient_id\tchart\tage_days\tkind\tz_score\tmessage")?;
    for patient in patients {
        for trend in &patient.trends {
            for alert in &trend.alerts {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{:.2}\t{}",
                    patient.patient_id,
                    alert.chart.as_str(),
                    alert.age_days,
                    alert.kind.as_str(),
                    alert.z_score,
                    alert.message
                )?;
            }
        }
    }
    w.flush()
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.flush()
}

pub fn build_summary(input: &ReportInput<'_>) -> SummaryData {
    let mut per_chart: BTreeMap<ChartType, (Vec<f64>, usize, BTreeMap<String, usize>)> = BTreeMap::new();
    let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
    let mut alerts: BTreeMap<String, usize> = BTreeMap::new();
    let mut patients = Vec::with_capacity(input.patients.len());
    let mut n_visits = 0usize;

    for patient in input.patients {
        n_visits += patient.visits.len();
        for va in &patient.assessments {
            *statuses.entry(va.status.as_str().to_string()).or_default() += 1;
            for ca in &va.charts {
                let entry = per_chart.entry(ca.chart).or_default();
                match ca.assessment.z_score {
                    Some(z) => entry.0.push(z),
                    None => entry.1 += 1,
                }
                *entry.2.entry(ca.assessment.classification.clone()).or_default() += 1;
            }
        }

        let mut trends = Vec::with_capacity(patient.trends.len());
        for trend in &patient.trends {
            for alert in &trend.alerts {
                *alerts.entry(alert.kind.as_str().to_string()).or_default() += 1;
            }
            let latest_z = patient
                .assessments
                .iter()
                .rev()
                .find_map(|va| va.z(trend.chart));
            trends.push(TrendSummary {
                chart: trend.chart.as_str().to_string(),
                direction: trend.direction,
                latest_z,
                delta_z: trend.comparison.map(|c| c.delta_z),
                alerts: trend.alerts.len(),
            });
        }

        patients.push(PatientSummary {
            patient_id: patient.patient_id.clone(),
            gender: patient.gender.as_str().to_string(),
            n_visits: patient.visits.len(),
            latest_status: patient
                .assessments
                .last()
                .map(|va| va.status.as_str().to_string())
                .unwrap_or_default(),
            trends,
            projected_weight: patient.projection.as_ref().map(|p| p.projection.predicted_weight),
            projection_confidence: patient
                .projection
                .as_ref()
                .map(|p| p.projection.confidence.as_str().to_string()),
        });
    }

    let charts = per_chart
        .into_iter()
        .map(|(chart, (zs, unassessable, classifications))| ChartStats {
            chart: chart.as_str().to_string(),
            n_assessed: zs.len(),
            n_unassessable: unassessable,
            z_median: median(&zs),
            z_p10: p10(&zs),
            z_p90: p90(&zs),
            classifications,
        })
        .collect();

    SummaryData {
        tool: input.tool.clone(),
        reference: input.reference.clone(),
        n_patients: input.patients.len(),
        n_visits,
        charts,
        statuses,
        alerts,
        patients,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage8_report.rs"]
mod tests;
