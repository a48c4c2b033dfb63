use crate::report::{SummaryData, format_opt_2};

pub fn render_report_text(data: &SummaryData) -> String {
    let mut out = String::new();

    out.push_str("Child Growth Assessment Report\n");
    out.push_str("==============================\n\n");

    out.push_str("1. Reference data\n");
    out.push_str(&format!("Source: {}\n", data.reference.source));
    out.push_str(&format!("Snapshot version: {}\n", data.reference.snapshot_version));
    out.push_str(&format!("Charts: {}\n", data.reference.charts.join(", ")));
    out.push_str(&format!(
        "Rows accepted: {}, dropped: {} (duplicate ages: {})\n\n",
        data.reference.accepted_rows, data.reference.dropped_rows, data.reference.duplicate_ages
    ));

    out.push_str("2. Cohort\n");
    out.push_str(&format!(
        "Patients: {}\nVisits: {}\n",
        data.n_patients, data.n_visits
    ));
    for (status, count) in &data.statuses {
        out.push_str(&format!("  {status}: {count}\n"));
    }
    out.push('\n');

    out.push_str("3. Charts\n");
    for chart in &data.charts {
        out.push_str(&format!(
            "{}: assessed {}, unable to assess {}, Z median {}, P10 {}, P90 {}\n",
            chart.chart,
            chart.n_assessed,
            chart.n_unassessable,
            format_opt_2(chart.z_median),
            format_opt_2(chart.z_p10),
            format_opt_2(chart.z_p90)
        ));
        for (label, count) in &chart.classifications {
            out.push_str(&format!("  {label}: {count}\n"));
        }
    }
    out.push('\n');

    out.push_str("4. Alerts\n");
    if data.alerts.is_empty() {
        out.push_str("None\n");
    }
    for (kind, count) in &data.alerts {
        out.push_str(&format!("{kind}: {count}\n"));
    }
    let flagged: Vec<&str> = data
        .patients
        .iter()
        .filter(|p| p.trends.iter().any(|t| t.alerts > 0))
        .map(|p| p.patient_id.as_str())
        .collect();
    if !flagged.is_empty() {
        out.push_str(&format!("Patients with alerts: {}\n", flagged.join(", ")));
    }

    out
}
