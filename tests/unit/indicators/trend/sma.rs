//! Unit tests for SMA indicator

use perpscan::indicators::trend::calculate_sma;
use perpscan::indicators::IndicatorError;

#[test]
fn test_sma_uses_last_window() {
    let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
    assert_eq!(sma.value, 4.0);
    assert_eq!(sma.period, 3);
}

#[test]
fn test_sma_insufficient_data() {
    assert!(matches!(
        calculate_sma(&[1.0, 2.0], 3),
        Err(IndicatorError::InsufficientData { required: 3, available: 2, .. })
    ));
}
