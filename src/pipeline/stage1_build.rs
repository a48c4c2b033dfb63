use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::{ChartType, DuplicateAgePolicy, EngineParams, Gender, ReferencePoint};
use crate::reference::{RawReferenceRow, RawValue, ReferenceSet, ReferenceTable};

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("reference dataset produced no valid rows ({dropped} dropped)")]
    Empty { dropped: usize },
    #[error("no valid {} reference rows for gender {}", chart.as_str(), gender.as_str())]
    MissingGender { chart: ChartType, gender: Gender },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    InvalidGender,
    InvalidChart,
    InvalidAge,
    InvalidLambda,
    NonPositiveMedian,
    NonPositiveSigma,
    MissingSdLine(&'static str),
    DuplicateAge,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::InvalidGender => write!(f, "gender is missing or unrecognised"),
            DropReason::InvalidChart => write!(f, "chart type is missing or unrecognised"),
            DropReason::InvalidAge => write!(f, "age is not a non-negative whole number of days"),
            DropReason::InvalidLambda => write!(f, "L is not a finite number"),
            DropReason::NonPositiveMedian => write!(f, "M is missing or not positive"),
            DropReason::NonPositiveSigma => write!(f, "S is missing or not positive"),
            DropReason::MissingSdLine(name) => write!(f, "{name} is not a finite number"),
            DropReason::DuplicateAge => write!(f, "age already present for this gender and chart"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    pub row_index: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub accepted: usize,
    /// Includes `duplicates`.
    pub dropped: usize,
    pub duplicates: usize,
    pub dropped_reasons: Vec<DroppedRow>,
}

impl BuildReport {
    fn drop_row(&mut self, row_index: usize, reason: DropReason) {
        self.dropped += 1;
        if reason == DropReason::DuplicateAge {
            self.duplicates += 1;
        }
        tracing::debug!(row = row_index, %reason, "dropping reference row");
        self.dropped_reasons.push(DroppedRow { row_index, reason });
    }
}

/// Validate one raw row into a strict reference point.
pub fn parse_row(row: &RawReferenceRow) -> Result<ReferencePoint, DropReason> {
    let gender = row
        .gender
        .as_str()
        .and_then(Gender::parse)
        .or_else(|| match row.gender.as_f64() {
            Some(v) if v == 1.0 => Some(Gender::Male),
            Some(v) if v == 2.0 => Some(Gender::Female),
            _ => None,
        })
        .ok_or(DropReason::InvalidGender)?;

    let age = row.age_days.as_f64().ok_or(DropReason::InvalidAge)?;
    if age < 0.0 || age.fract() != 0.0 || age > u32::MAX as f64 {
        return Err(DropReason::InvalidAge);
    }

    let l = row.l.as_f64().ok_or(DropReason::InvalidLambda)?;
    let m = row.m.as_f64().filter(|v| *v > 0.0).ok_or(DropReason::NonPositiveMedian)?;
    let s = row.s.as_f64().filter(|v| *v > 0.0).ok_or(DropReason::NonPositiveSigma)?;

    let required = |value: &RawValue, name: &'static str| {
        value.as_f64().ok_or(DropReason::MissingSdLine(name))
    };

    Ok(ReferencePoint {
        age_days: age as u32,
        gender,
        l,
        m,
        s,
        sd0: required(&row.sd0, "SD0")?,
        sd1neg: required(&row.sd1neg, "SD1neg")?,
        sd1pos: required(&row.sd1pos, "SD1")?,
        sd2neg: required(&row.sd2neg, "SD2neg")?,
        sd2pos: required(&row.sd2pos, "SD2")?,
        sd3neg: required(&row.sd3neg, "SD3neg")?,
        sd3pos: required(&row.sd3pos, "SD3")?,
        sd4neg: row.sd4neg.as_f64(),
        sd4pos: row.sd4pos.as_f64(),
    })
}

fn parse_chart(row: &RawReferenceRow, default_chart: Option<ChartType>) -> Result<ChartType, DropReason> {
    if row.chart_type.is_missing() {
        return default_chart.ok_or(DropReason::InvalidChart);
    }
    row.chart_type
        .as_str()
        .and_then(ChartType::parse)
        .ok_or(DropReason::InvalidChart)
}

/// Build every chart present in `rows`. Rows without a chart column fall back to `default_chart`.
pub fn build_reference_set(
    rows: &[RawReferenceRow],
    default_chart: Option<ChartType>,
    params: &EngineParams,
) -> Result<(ReferenceSet, BuildReport), BuildError> {
    let mut report = BuildReport::default();
    let mut grouped: BTreeMap<ChartType, Vec<(usize, ReferencePoint)>> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let parsed = parse_chart(row, default_chart).and_then(|chart| Ok((chart, parse_row(row)?)));
        match parsed {
            Ok((chart, point)) => grouped.entry(chart).or_default().push((idx, point)),
            Err(reason) => report.drop_row(idx, reason),
        }
    }

    let mut set = ReferenceSet::default();
    for (chart, points) in grouped {
        let table = assemble_table(chart, points, params, &mut report)?;
        set.insert(table);
    }

    if set.is_empty() {
        return Err(BuildError::Empty {
            dropped: report.dropped,
        });
    }

    tracing::info!(
        charts = set.charts().count(),
        accepted = report.accepted,
        dropped = report.dropped,
        duplicates = report.duplicates,
        "reference tables built"
    );
    Ok((set, report))
}

/// Build a single chart. Rows tagged with another chart are ignored; untagged rows count as `chart`.
pub fn build_reference_table(
    chart: ChartType,
    rows: &[RawReferenceRow],
    params: &EngineParams,
) -> Result<(ReferenceTable, BuildReport), BuildError> {
    let mut report = BuildReport::default();
    let mut points = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match parse_chart(row, Some(chart)) {
            Ok(c) if c != chart => continue,
            Ok(_) => match parse_row(row) {
                Ok(point) => points.push((idx, point)),
                Err(reason) => report.drop_row(idx, reason),
            },
            Err(reason) => report.drop_row(idx, reason),
        }
    }

    if points.is_empty() {
        return Err(BuildError::Empty {
            dropped: report.dropped,
        });
    }
    let table = assemble_table(chart, points, params, &mut report)?;
    Ok((table, report))
}

fn assemble_table(
    chart: ChartType,
    points: Vec<(usize, ReferencePoint)>,
    params: &EngineParams,
    report: &mut BuildReport,
) -> Result<ReferenceTable, BuildError> {
    let mut by_gender: BTreeMap<Gender, Vec<(usize, ReferencePoint)>> = BTreeMap::new();
    for (idx, point) in points {
        by_gender.entry(point.gender).or_default().push((idx, point));
    }

    let mut sorted = BTreeMap::new();
    for (gender, mut entries) in by_gender {
        // stable: equal ages keep input order
        entries.sort_by_key(|(_, p)| p.age_days);
        let mut kept: Vec<(usize, ReferencePoint)> = Vec::with_capacity(entries.len());
        for (idx, point) in entries {
            let repeats_last = kept
                .last()
                .is_some_and(|(_, last)| last.age_days == point.age_days);
            if !repeats_last {
                kept.push((idx, point));
                continue;
            }
            match params.duplicate_age_policy {
                DuplicateAgePolicy::KeepFirst => report.drop_row(idx, DropReason::DuplicateAge),
                DuplicateAgePolicy::KeepLast => {
                    if let Some(last) = kept.last_mut() {
                        report.drop_row(last.0, DropReason::DuplicateAge);
                        *last = (idx, point);
                    }
                }
            }
        }
        report.accepted += kept.len();
        sorted.insert(gender, kept.into_iter().map(|(_, p)| p).collect::<Vec<_>>());
    }

    for gender in &params.required_genders {
        if sorted.get(gender).is_none_or(|pts: &Vec<ReferencePoint>| pts.is_empty()) {
            return Err(BuildError::MissingGender {
                chart,
                gender: *gender,
            });
        }
    }

    Ok(ReferenceTable::from_sorted(chart, sorted))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_build.rs"]
mod tests;
