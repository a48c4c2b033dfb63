use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;

use crate::input::compress::open_maybe_gz;
use crate::input::{Header, InputError};
use crate::model::{Gender, Visit};

fn parse_optional_number(raw: Option<&&str>, column: &str, line_no: usize) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(line = line_no, column, value = raw, "unparsable number; treating as missing");
            None
        }
    }
}

fn parse_age(raw: &str) -> Option<i64> {
    let v = raw.trim().parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

/// Load visits from a TSV. Rows without a usable sex or age are skipped with a warning;
/// out-of-range ages and bad values are kept and surface later as "Unable to assess".
pub fn load_visits(path: &Path) -> Result<Vec<Visit>, InputError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    if reader.read_line(&mut buf)? == 0 {
        return Err(InputError::Parse {
            path: path.to_path_buf(),
            message: "measurement file is empty".to_string(),
        });
    }
    let header = Header::parse(&buf);
    let patient_col = header.require(path, "patient_id", &["patient_id", "patient", "id"])?;
    let sex_col = header.require(path, "sex", &["sex", "gender"])?;
    let age_col = header.require(path, "age_days", &["age_days", "agedays", "age"])?;
    let weight_col = header.find(&["weight_kg", "weight"]);
    let height_col = header.find(&["height_cm", "length_cm", "height", "length"]);
    let head_col = header.find(&["head_cm", "head_circumference_cm", "head_circumference", "hc"]);
    let date_col = header.find(&["date", "measured_on"]);

    let mut visits = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let get = |idx: Option<usize>| idx.and_then(|i| fields.get(i));

        let Some(gender) = fields.get(sex_col).and_then(|s| Gender::parse(s)) else {
            tracing::warn!(line = line_no, "unrecognised sex; skipping measurement row");
            continue;
        };
        let Some(age_days) = fields.get(age_col).and_then(|s| parse_age(s)) else {
            tracing::warn!(line = line_no, "unparsable age; skipping measurement row");
            continue;
        };
        let date = get(date_col).and_then(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| {
                    tracing::warn!(line = line_no, value = s, "unparsable date; ignoring");
                })
                .ok()
        });

        visits.push(Visit {
            patient_id: fields.get(patient_col).map(|s| s.trim().to_string()).unwrap_or_default(),
            gender,
            age_days,
            date,
            weight_kg: parse_optional_number(get(weight_col), "weight_kg", line_no),
            height_cm: parse_optional_number(get(height_col), "height_cm", line_no),
            head_circumference_cm: parse_optional_number(get(head_col), "head_cm", line_no),
        });
    }

    tracing::info!(path = %path.display(), visits = visits.len(), "loaded measurements");
    Ok(visits)
}

/// Group visits per patient, each series ordered by age. Dates only break ties,
/// so undated visits still land in age order.
pub fn group_by_patient(visits: Vec<Visit>) -> BTreeMap<String, Vec<Visit>> {
    let mut grouped: BTreeMap<String, Vec<Visit>> = BTreeMap::new();
    for visit in visits {
        grouped.entry(visit.patient_id.clone()).or_default().push(visit);
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|v| (v.age_days, v.date));
    }
    grouped
}
