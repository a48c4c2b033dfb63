use super::*;
use crate::testutil::raw_row;

fn mixed_rows() -> Vec<RawReferenceRow> {
    let mut rows = vec![
        raw_row("M", 0.0, 0.1, 3.3, 0.1),
        raw_row("M", 30.0, 0.1, 4.0, 0.1),
        raw_row("M", 30.0, 0.1, 9.9, 0.1),
        raw_row("F", 0.0, 0.1, 3.2, 0.1),
        raw_row("F", 30.0, 0.1, 3.9, 0.1),
        raw_row("M", 60.0, 0.1, 0.0, 0.1),
        raw_row("M", 90.0, 0.1, 5.0, -1.0),
        raw_row("M", -1.0, 0.1, 3.0, 0.1),
        raw_row("M", 0.0, 0.1, 3.0, 0.1),
        raw_row("M", 120.0, 0.1, 5.5, 0.1),
        raw_row("X", 0.0, 0.1, 3.0, 0.1),
        raw_row("M", 150.0, 0.1, 6.0, 0.1),
        raw_row("M", 15.5, 0.1, 3.6, 0.1),
    ];
    rows[4].m = RawValue::Text(" 3.9 ".to_string());
    rows[4].s = RawValue::Text("0.1".to_string());
    rows[8].age_days = RawValue::Text("abc".to_string());
    rows[9].sd2neg = RawValue::Text("x".to_string());
    rows[11].sd4pos = RawValue::Missing;
    rows
}

#[test]
fn test_parse_row_accepts_text_numbers() {
    let rows = mixed_rows();
    let p = parse_row(&rows[4]).unwrap();
    assert_eq!(p.gender, Gender::Female);
    assert_eq!(p.age_days, 30);
    assert!((p.m - 3.9).abs() < 1e-12);
}

#[test]
fn test_parse_row_rejections() {
    let rows = mixed_rows();
    assert_eq!(parse_row(&rows[5]), Err(DropReason::NonPositiveMedian));
    assert_eq!(parse_row(&rows[6]), Err(DropReason::NonPositiveSigma));
    assert_eq!(parse_row(&rows[7]), Err(DropReason::InvalidAge));
    assert_eq!(parse_row(&rows[8]), Err(DropReason::InvalidAge));
    assert_eq!(parse_row(&rows[9]), Err(DropReason::MissingSdLine("SD2neg")));
    assert_eq!(parse_row(&rows[10]), Err(DropReason::InvalidGender));
    assert_eq!(parse_row(&rows[12]), Err(DropReason::InvalidAge));
}

#[test]
fn test_parse_row_rejects_non_finite_sd_and_keeps_optional_sd4_absent() {
    let mut row = raw_row("M", 10.0, 0.1, 3.3, 0.1);
    row.sd4pos = RawValue::Text("NaN".to_string());
    row.sd4neg = RawValue::Missing;
    let p = parse_row(&row).unwrap();
    assert_eq!(p.sd4pos, None);
    assert_eq!(p.sd4neg, None);

    row.sd0 = RawValue::Number(f64::INFINITY);
    assert_eq!(parse_row(&row), Err(DropReason::MissingSdLine("SD0")));
}

#[test]
fn test_build_counts_drops_and_keeps_first_duplicate() {
    let params = EngineParams::default_v1();
    let (set, report) =
        build_reference_set(&mixed_rows(), Some(ChartType::WeightForAge), &params).unwrap();

    assert_eq!(report.accepted, 5);
    assert_eq!(report.dropped, 8);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.dropped_reasons.len(), 8);
    assert!(
        report
            .dropped_reasons
            .iter()
            .any(|d| d.row_index == 2 && d.reason == DropReason::DuplicateAge)
    );

    let table = set.get(ChartType::WeightForAge).unwrap();
    let male = table.points(Gender::Male);
    let ages: Vec<u32> = male.iter().map(|p| p.age_days).collect();
    assert_eq!(ages, vec![0, 30, 150]);
    assert!((male[1].m - 4.0).abs() < 1e-12);
    assert_eq!(male[2].sd4pos, None);
    assert!(male[2].sd4neg.is_some());
}

#[test]
fn test_build_keep_last_duplicate_policy() {
    let mut params = EngineParams::default_v1();
    params.duplicate_age_policy = DuplicateAgePolicy::KeepLast;
    let (set, report) =
        build_reference_set(&mixed_rows(), Some(ChartType::WeightForAge), &params).unwrap();

    let male = set.get(ChartType::WeightForAge).unwrap().points(Gender::Male);
    assert!((male[1].m - 9.9).abs() < 1e-12);
    assert!(
        report
            .dropped_reasons
            .iter()
            .any(|d| d.row_index == 1 && d.reason == DropReason::DuplicateAge)
    );
}

#[test]
fn test_build_fails_when_required_gender_missing() {
    let rows = vec![raw_row("M", 0.0, 0.1, 3.3, 0.1), raw_row("M", 30.0, 0.1, 4.0, 0.1)];
    let params = EngineParams::default_v1();
    let err = build_reference_set(&rows, Some(ChartType::WeightForAge), &params).unwrap_err();
    assert_eq!(
        err,
        BuildError::MissingGender {
            chart: ChartType::WeightForAge,
            gender: Gender::Female
        }
    );

    let mut relaxed = EngineParams::default_v1();
    relaxed.required_genders = vec![Gender::Male];
    assert!(build_reference_set(&rows, Some(ChartType::WeightForAge), &relaxed).is_ok());
}

#[test]
fn test_build_fails_when_nothing_valid() {
    let rows = vec![raw_row("M", 0.0, 0.1, -1.0, 0.1), raw_row("Q", 0.0, 0.1, 3.0, 0.1)];
    let err = build_reference_set(&rows, Some(ChartType::WeightForAge), &EngineParams::default_v1())
        .unwrap_err();
    assert_eq!(err, BuildError::Empty { dropped: 2 });
}

#[test]
fn test_build_routes_rows_by_chart_column() {
    let mut rows = vec![
        raw_row("M", 0.0, 0.1, 3.3, 0.1),
        raw_row("F", 0.0, 0.1, 3.2, 0.1),
        raw_row("M", 0.0, 1.0, 49.9, 0.04),
        raw_row("F", 0.0, 1.0, 49.1, 0.04),
        raw_row("F", 0.0, 1.0, 49.1, 0.04),
    ];
    rows[0].chart_type = RawValue::from("wfa");
    rows[1].chart_type = RawValue::from("weight-for-age");
    rows[2].chart_type = RawValue::from("lhfa");
    rows[3].chart_type = RawValue::from("height_for_age");
    rows[4].chart_type = RawValue::from("zzz");

    let (set, report) = build_reference_set(&rows, None, &EngineParams::default_v1()).unwrap();
    assert_eq!(set.charts().count(), 2);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.dropped_reasons[0].reason, DropReason::InvalidChart);

    let (table, _) = build_reference_table(ChartType::HeightForAge, &rows, &EngineParams::default_v1())
        .unwrap();
    assert_eq!(table.len(), 2);
    assert!((table.points(Gender::Male)[0].m - 49.9).abs() < 1e-12);
}

#[test]
fn test_untagged_rows_need_default_chart() {
    let rows = vec![raw_row("M", 0.0, 0.1, 3.3, 0.1)];
    let err = build_reference_set(&rows, None, &EngineParams::default_v1()).unwrap_err();
    assert_eq!(err, BuildError::Empty { dropped: 1 });
}

#[test]
fn test_raw_rows_from_json() {
    let json = r#"[
        {"sex": "male", "chart": "wfa", "age": 0, "L": 0.35, "M": "3.3", "S": 0.14,
         "SD0": 3.3, "SD1neg": 2.9, "SD1": 3.9, "SD2neg": 2.5, "SD2": 4.4,
         "SD3neg": 2.1, "SD3": 5.0, "SD4neg": null},
        {"gender": 2, "chart_type": "wfa", "age_days": 0, "l": 0.38, "m": 3.2, "s": 0.14,
         "sd0": 3.2, "sd1neg": 2.8, "sd1pos": 3.7, "sd2neg": 2.4, "sd2pos": 4.2,
         "sd3neg": 2.0, "sd3pos": 4.8}
    ]"#;
    let rows: Vec<RawReferenceRow> = serde_json::from_str(json).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].m, RawValue::Text("3.3".to_string()));
    assert!(rows[0].sd4neg.is_missing());
    assert!(rows[1].sd4pos.is_missing());

    let (set, report) = build_reference_set(&rows, None, &EngineParams::default_v1()).unwrap();
    assert_eq!(report.accepted, 2);
    let table = set.get(ChartType::WeightForAge).unwrap();
    assert_eq!(table.points(Gender::Female)[0].gender, Gender::Female);
}
