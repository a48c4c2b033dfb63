use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;
use crate::model::{DuplicateAgePolicy, Gender};
use crate::reference::RawValue;
use crate::testutil::make_temp_dir;

const REFERENCE_TSV: &str = "Sex\tAge_days\tL\tM\tS\tSD0\tSD1neg\tSD1\tSD2neg\tSD2\tSD3neg\tSD3\n\
1\t0\t0.3487\t3.3464\t0.14602\t3.3464\t2.9\t3.9\t2.5\t4.4\t2.1\t5.0\n\
# comment\n\
\n\
F\t0\t0.3809\t3.2322\t0.14171\t3.2322\t2.8\t3.7\t2.4\t4.2\t2.0\t4.8\n";

#[test]
fn test_load_reference_tsv() {
    let dir = make_temp_dir();
    let path = dir.join("wfa.tsv");
    fs::write(&path, REFERENCE_TSV).unwrap();

    let rows = load_reference_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].gender, RawValue::Text("1".to_string()));
    assert_eq!(rows[0].m.as_f64(), Some(3.3464));
    assert_eq!(rows[0].sd1pos.as_f64(), Some(3.9));
    assert!(rows[0].chart_type.is_missing());
    assert!(rows[0].sd4neg.is_missing());
    assert_eq!(rows[1].gender.as_str(), Some("F"));
}

#[test]
fn test_load_reference_tsv_gz() {
    let dir = make_temp_dir();
    let path = dir.join("wfa.tsv.gz");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(REFERENCE_TSV.as_bytes()).unwrap();
    fs::write(&path, enc.finish().unwrap()).unwrap();

    let rows = load_reference_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].l.as_f64(), Some(0.3809));
}

#[test]
fn test_load_reference_missing_column() {
    let dir = make_temp_dir();
    let path = dir.join("bad.tsv");
    fs::write(&path, "sex\tage_days\tL\tS\n1\t0\t0.1\t0.1\n").unwrap();
    let err = load_reference_rows(&path).unwrap_err();
    assert!(matches!(err, InputError::MissingColumn { column: "m", .. }));
}

#[test]
fn test_load_reference_json() {
    let dir = make_temp_dir();
    let path = dir.join("ref.json");
    fs::write(
        &path,
        r#"[
            {"sex": "male", "chart": "weight-for-age", "age": 0, "L": 0.35, "M": 3.35, "S": 0.146, "SD0": 3.35, "sd4": null},
            {"gender": 2, "age_days": "30", "l": 0.38, "m": 4.2, "s": 0.14}
        ]"#,
    )
    .unwrap();

    let rows = load_reference_rows(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].chart_type.as_str(), Some("weight-for-age"));
    assert_eq!(rows[0].age_days.as_f64(), Some(0.0));
    assert!(rows[0].sd4pos.is_missing());
    assert_eq!(rows[1].gender, RawValue::Number(2.0));
    assert_eq!(rows[1].age_days.as_f64(), Some(30.0));
    assert!(rows[1].sd0.is_missing());
}

#[test]
fn test_load_reference_invalid_json() {
    let dir = make_temp_dir();
    let path = dir.join("ref.json");
    fs::write(&path, "{not json").unwrap();
    assert!(matches!(load_reference_rows(&path), Err(InputError::Json { .. })));
}

#[test]
fn test_open_missing_file() {
    let err = load_reference_rows(std::path::Path::new("/nonexistent/ref.tsv")).unwrap_err();
    assert!(matches!(err, InputError::Open { .. }));
}

#[test]
fn test_load_visits() {
    let dir = make_temp_dir();
    let path = dir.join("visits.tsv");
    fs::write(
        &path,
        "patient_id\tsex\tage_days\tweight_kg\theight_cm\thead_cm\tdate\n\
p1\tmale\t30\t4.5\t54.0\t\t2024-02-01\n\
p1\tX\t60\t5.0\t\t\t2024-03-01\n\
p2\tfemale\t-3\t3.1\tabc\t34.5\t\n\
p2\t2\tlate\t3.1\t\t\t\n",
    )
    .unwrap();

    let visits = load_visits(&path).unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].patient_id, "p1");
    assert_eq!(visits[0].gender, Gender::Male);
    assert_eq!(visits[0].weight_kg, Some(4.5));
    assert_eq!(visits[0].head_circumference_cm, None);
    assert_eq!(visits[0].date, chrono::NaiveDate::from_ymd_opt(2024, 2, 1));
    assert_eq!(visits[1].age_days, -3);
    assert_eq!(visits[1].height_cm, None);
    assert_eq!(visits[1].head_circumference_cm, Some(34.5));
    assert_eq!(visits[1].date, None);
}

#[test]
fn test_group_by_patient_orders_by_date() {
    let dir = make_temp_dir();
    let path = dir.join("visits.tsv");
    fs::write(
        &path,
        "id\tgender\tage\tweight\tdate\n\
b\tm\t90\t6.0\t2024-04-01\n\
a\tf\t60\t5.0\t2024-03-01\n\
b\tm\t30\t4.5\t2024-02-01\n",
    )
    .unwrap();

    let grouped = group_by_patient(load_visits(&path).unwrap());
    let ids: Vec<&String> = grouped.keys().collect();
    assert_eq!(ids, vec!["a", "b"]);
    let ages: Vec<i64> = grouped["b"].iter().map(|v| v.age_days).collect();
    assert_eq!(ages, vec![30, 90]);
}

#[test]
fn test_group_by_patient_undated_visit_keeps_age_order() {
    let dir = make_temp_dir();
    let path = dir.join("visits.tsv");
    fs::write(
        &path,
        "patient_id\tsex\tage_days\tweight_kg\tdate\n\
c\tm\t90\t6.0\t\n\
c\tm\t30\t4.5\t2024-02-01\n\
c\tm\t60\t5.2\t2024-03-01\n",
    )
    .unwrap();

    let grouped = group_by_patient(load_visits(&path).unwrap());
    let ages: Vec<i64> = grouped["c"].iter().map(|v| v.age_days).collect();
    assert_eq!(ages, vec![30, 60, 90]);
    assert_eq!(grouped["c"][2].date, None);
}

#[test]
fn test_load_params_partial_override() {
    let dir = make_temp_dir();
    let path = dir.join("params.json");
    fs::write(&path, r#"{"z_saturation": 6.0, "duplicate_age_policy": "keep_last"}"#).unwrap();

    let params = load_params(&path).unwrap();
    assert_eq!(params.z_saturation, 6.0);
    assert_eq!(params.duplicate_age_policy, DuplicateAgePolicy::KeepLast);
    assert_eq!(params.max_age_days, 1856);
}

#[test]
fn test_load_params_rejects_inverted_percentiles() {
    let dir = make_temp_dir();
    let path = dir.join("params.json");
    fs::write(&path, r#"{"percentile_floor": 50.0, "percentile_ceiling": 10.0}"#).unwrap();
    assert!(matches!(load_params(&path), Err(InputError::Parse { .. })));
}
