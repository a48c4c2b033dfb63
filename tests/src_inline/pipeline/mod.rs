use super::*;
use crate::model::AlertKind;
use crate::pipeline::stage7_trend::{Confidence, TrendDirection};
use crate::testutil::full_set;

fn visit(age_days: i64, weight: Option<f64>, height: Option<f64>) -> Visit {
    Visit {
        patient_id: "child-1".to_string(),
        gender: Gender::Male,
        age_days,
        date: None,
        weight_kg: weight,
        height_cm: height,
        head_circumference_cm: None,
    }
}

fn median_weight(age: f64) -> f64 {
    3.3 + 0.008 * age
}

#[test]
fn test_analyze_patient_builds_trends_and_projection() {
    let set = full_set();
    let params = EngineParams::default_v1();
    let visits = vec![
        visit(180, Some(median_weight(180.0)), Some(50.0 + 0.03 * 180.0)),
        visit(270, Some(median_weight(270.0)), None),
        visit(360, Some(median_weight(360.0)), Some(50.0 + 0.03 * 360.0)),
    ];
    let result = analyze_patient(&set, visits, &params, Some(30)).unwrap();

    assert_eq!(result.patient_id, "child-1");
    assert_eq!(result.assessments.len(), 3);
    let charts: Vec<ChartType> = result.trends.iter().map(|t| t.chart).collect();
    assert_eq!(
        charts,
        vec![ChartType::WeightForAge, ChartType::HeightForAge, ChartType::BmiForAge]
    );
    let wfa = &result.trends[0];
    assert_eq!(wfa.direction, TrendDirection::Stable);
    assert_eq!(wfa.velocities.len(), 2);
    assert!(wfa.alerts.is_empty());

    let projection = result.projection.unwrap();
    assert_eq!(projection.from_age_days, 360);
    assert_eq!(projection.target_age_days, 390);
    assert_eq!(projection.projection.confidence, Confidence::High);
    assert!((projection.projection.predicted_weight - (median_weight(360.0) + 0.012 * 30.0)).abs() < 1e-9);
}

#[test]
fn test_analyze_patient_raises_alerts_on_faltering() {
    let set = full_set();
    let params = EngineParams::default_v1();
    let visits = vec![
        visit(300, Some(median_weight(300.0)), None),
        visit(330, Some(median_weight(330.0) * 0.75), None),
        visit(360, Some(median_weight(360.0) * 0.65), None),
    ];
    let result = analyze_patient(&set, visits, &params, None).unwrap();
    assert!(result.projection.is_none());
    let wfa = &result.trends[0];
    assert_eq!(wfa.direction, TrendDirection::Decreasing);
    assert!(wfa.alerts.iter().any(|a| a.kind == AlertKind::SevereDeviation));
    assert!(wfa.alerts.iter().any(|a| a.kind == AlertKind::Worsening));
}

#[test]
fn test_analyze_patient_empty() {
    let set = full_set();
    assert!(analyze_patient(&set, Vec::new(), &EngineParams::default_v1(), None).is_none());
}
