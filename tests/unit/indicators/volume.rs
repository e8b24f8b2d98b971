//! Unit tests for volume average and spike detection

use perpscan::indicators::volume::{calculate_volume, VOLUME_SPIKE_MULTIPLIER};

#[test]
fn test_volume_spike_against_average() {
    let mut volumes = vec![1000.0; 19];
    volumes.push(2000.0);

    let volume = calculate_volume(&volumes, 20).unwrap();
    assert_eq!(volume.volume, 2000.0);
    assert_eq!(volume.volume_ma, 1050.0);
    assert!(volume.is_spike(VOLUME_SPIKE_MULTIPLIER));
}

#[test]
fn test_volume_without_spike() {
    let volume = calculate_volume(&[1000.0; 20], 20).unwrap();
    assert!(!volume.is_spike(VOLUME_SPIKE_MULTIPLIER));
}

#[test]
fn test_volume_insufficient_data() {
    assert!(calculate_volume(&[1000.0; 5], 20).is_err());
}
