use super::*;

fn lms(l: f64, m: f64, s: f64) -> Lms {
    Lms { l, m, s }
}

#[test]
fn test_log_branch_when_lambda_zero() {
    let params = EngineParams::default_v1();
    let x = 10.0 * 0.1f64.exp();
    let z = compute_zscore(x, 100, lms(0.0, 10.0, 0.1), &params).unwrap();
    assert!((z - 1.0).abs() < 1e-9);
}

#[test]
fn test_power_branch() {
    let params = EngineParams::default_v1();
    let z = compute_zscore(11.0, 100, lms(1.0, 10.0, 0.1), &params).unwrap();
    assert!((z - 1.0).abs() < 1e-9);
    let z = compute_zscore(9.0, 100, lms(1.0, 10.0, 0.1), &params).unwrap();
    assert!((z + 1.0).abs() < 1e-9);
}

#[test]
fn test_rounds_to_two_decimals() {
    let params = EngineParams::default_v1();
    let z = compute_zscore(10.123, 0, lms(1.0, 10.0, 0.1), &params).unwrap();
    assert!((z - 0.12).abs() < 1e-9);
    assert_eq!(round2(1.005_1), 1.01);
    assert_eq!(round2(-2.344), -2.34);
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let params = EngineParams::default_v1();
    let good = lms(1.0, 10.0, 0.1);
    assert_eq!(
        compute_zscore(0.0, 10, good, &params),
        Err(InvalidMeasurement::NonPositiveValue(0.0))
    );
    assert_eq!(
        compute_zscore(-3.0, 10, good, &params),
        Err(InvalidMeasurement::NonPositiveValue(-3.0))
    );
    assert_eq!(
        compute_zscore(f64::NAN, 10, good, &params),
        Err(InvalidMeasurement::NonFiniteValue)
    );
    assert_eq!(
        compute_zscore(10.0, -1, good, &params),
        Err(InvalidMeasurement::AgeOutOfRange {
            age_days: -1,
            max_age_days: 1856
        })
    );
    assert!(compute_zscore(10.0, 1857, good, &params).is_err());
    assert!(compute_zscore(10.0, 1856, good, &params).is_ok());
    assert_eq!(
        compute_zscore(10.0, 10, lms(1.0, 0.0, 0.1), &params),
        Err(InvalidMeasurement::InvalidLms)
    );
    assert_eq!(
        compute_zscore(10.0, 10, lms(1.0, 10.0, 0.0), &params),
        Err(InvalidMeasurement::InvalidLms)
    );
}

#[test]
fn test_saturation() {
    let params = EngineParams::default_v1();
    let z = compute_zscore(1000.0, 10, lms(1.0, 10.0, 0.1), &params).unwrap();
    assert_eq!(z, 10.0);
    // overflow to +inf
    let z = compute_zscore(100.0, 10, lms(400.0, 1.0, 0.1), &params).unwrap();
    assert_eq!(z, 10.0);
    // overflow to -inf
    let z = compute_zscore(0.01, 10, lms(-400.0, 1.0, 0.1), &params).unwrap();
    assert_eq!(z, -10.0);

    let mut narrow = EngineParams::default_v1();
    narrow.z_saturation = 5.0;
    let z = compute_zscore(1000.0, 10, lms(1.0, 10.0, 0.1), &narrow).unwrap();
    assert_eq!(z, 5.0);
}

#[test]
fn test_value_at_z_inverts_lms() {
    let p = lms(-0.4, 12.0, 0.09);
    for z in [-3.0, -1.5, 0.0, 0.7, 2.0] {
        let x = value_at_z(z, p).unwrap();
        assert!((lms_z(x, p) - z).abs() < 1e-9);
    }
    assert!((value_at_z(1.0, lms(0.0, 10.0, 0.1)).unwrap() - 10.0 * 0.1f64.exp()).abs() < 1e-12);
}
