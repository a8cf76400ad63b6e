//! Integration tests for the linearization workflow
//!
//! These tests exercise the full engine across the public API:
//! - dataset construction and validation
//! - curve fitting and bidirectional conversion against a known smooth law
//! - clipping policy and clip-state lifecycle
//! - persistence round trip through a real file
//!
//! The fixture mirrors a bench calibration of a MEMS mirror: per-actuator
//! command ramps with a quadratic command-to-deflection law.

use dm_linearizer::{
    CalibrationDataset, ClipStatus, ConversionError, DatasetError, Linearizer,
};

const STROKE_GAIN: f64 = 1e-6;
const N_MEAS: usize = 20;

/// Build a calibration for `ids` where actuator k's commands ramp from
/// 0.1*k to 0.1*k + 1 and deflection = command^2 * 1e-6
fn quadratic_calibration(ids: &[i32]) -> CalibrationDataset {
    let commands: Vec<Vec<f64>> = ids
        .iter()
        .enumerate()
        .map(|(k, _)| {
            (0..N_MEAS)
                .map(|i| 0.1 * k as f64 + i as f64 / (N_MEAS - 1) as f64)
                .collect()
        })
        .collect();
    let deflections: Vec<Vec<f64>> = commands
        .iter()
        .map(|row| row.iter().map(|c| c * c * STROKE_GAIN).collect())
        .collect();

    CalibrationDataset::new(ids.to_vec(), commands, deflections, Some("BENCH_REF".into()))
        .unwrap()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dm_linearizer_it_{}_{}", std::process::id(), name))
}

/// Capture engine logs when running with RUST_LOG set
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_full_conversion_workflow() {
    let mut lin = Linearizer::new(quadratic_calibration(&[2, 3, 5]));

    assert_eq!(lin.actuators_list(), &[2, 3, 5]);
    assert_eq!(lin.reference_tag(), Some("BENCH_REF"));
    assert!(lin.clipping_status().is_none());

    // Desired shape strictly inside each actuator's calibrated range
    let desired = vec![0.5e-6, 0.7e-6, 0.9e-6];
    let commands = lin.p2c(&desired).unwrap();

    // Quadratic law inverts to sqrt(p / gain)
    for (cmd, d) in commands.iter().zip(&desired) {
        let expected = (d / STROKE_GAIN).sqrt();
        assert!(
            (cmd - expected).abs() / expected < 1e-3,
            "command {} vs expected {}",
            cmd,
            expected
        );
    }

    // Readback direction closes the loop
    let readback = lin.c2p(&commands).unwrap();
    for (r, d) in readback.iter().zip(&desired) {
        assert!((r - d).abs() / d < 1e-3);
    }

    assert_eq!(
        lin.clipping_status().unwrap(),
        &[ClipStatus::InRange; 3][..]
    );
}

#[test]
fn test_clipping_policy_end_to_end() {
    let mut lin = Linearizer::new(quadratic_calibration(&[1, 2]));

    // One actuator pushed far above its range, one far below
    let commands = lin.p2c(&[1.0, -1.0]).unwrap();

    // Commands must sit on the calibrated bounds
    let ds_commands = lin.dataset().commands().to_vec();
    assert!((commands[0] - ds_commands[0][N_MEAS - 1]).abs() < 1e-9);
    assert!((commands[1] - ds_commands[1][0]).abs() < 1e-9);

    assert_eq!(
        lin.clipping_status().unwrap(),
        &[ClipStatus::High, ClipStatus::Low][..]
    );
    assert_eq!(lin.clipping_status_i8(), Some(vec![1, -1]));

    lin.reset_clipping_status();
    assert!(lin.clipping_status().is_none());
}

#[test]
fn test_dimension_errors_leave_state_intact() {
    let mut lin = Linearizer::new(quadratic_calibration(&[1, 2]));

    lin.p2c(&[0.5e-6, 0.5e-6]).unwrap();
    let before = lin.clipping_status().unwrap().to_vec();

    let err = lin.p2c(&[0.5e-6]).unwrap_err();
    assert_eq!(
        err,
        ConversionError::DimensionMismatch {
            expected: 2,
            actual: 1
        }
    );
    let err = lin.c2p(&[0.5, 0.5, 0.5]).unwrap_err();
    assert_eq!(
        err,
        ConversionError::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    );

    assert_eq!(lin.clipping_status().unwrap(), &before[..]);
}

#[test]
fn test_persistence_round_trip_rebuilds_engine() {
    init_logging();
    let path = temp_path("round_trip.cal");
    let _ = std::fs::remove_file(&path);

    let dataset = CalibrationDataset::new(
        vec![1, 2],
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        vec![vec![5.0, 6.0], vec![7.0, 8.0]],
        Some("PIPPO".to_string()),
    )
    .unwrap();

    let mut original = Linearizer::new(dataset);
    original.p2c(&[5.5, 7.5]).unwrap();
    original.save(&path, false).unwrap();

    let mut loaded = Linearizer::load(&path).unwrap();

    // Raw tables and tag round-trip exactly
    assert_eq!(loaded.actuators_list(), original.actuators_list());
    assert_eq!(loaded.dataset().commands(), original.dataset().commands());
    assert_eq!(
        loaded.dataset().deflections(),
        original.dataset().deflections()
    );
    assert_eq!(loaded.reference_tag(), Some("PIPPO"));

    // Derived state is rebuilt, not restored: clip state starts unset
    assert!(loaded.clipping_status().is_none());

    // The rebuilt curves behave identically
    let a = original.p2c(&[5.5, 7.5]).unwrap();
    let b = loaded.p2c(&[5.5, 7.5]).unwrap();
    assert_eq!(a, b);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_save_respects_overwrite_flag() {
    let path = temp_path("overwrite.cal");
    let _ = std::fs::remove_file(&path);

    let lin = Linearizer::new(quadratic_calibration(&[1]));
    lin.save(&path, false).unwrap();

    assert!(lin.save(&path, false).is_err());
    assert!(lin.save(&path, true).is_ok());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_construction_validation() {
    // Descending actuator ids
    let result = CalibrationDataset::new(
        vec![3, 2],
        vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        None,
    );
    assert!(matches!(
        result,
        Err(DatasetError::ActuatorsNotAscending { .. })
    ));

    // Mismatched shapes name both expected and actual dimensions
    let result = CalibrationDataset::new(
        vec![1, 2],
        vec![vec![0.0, 1.0]],
        vec![vec![0.0, 1.0], vec![0.0, 1.0]],
        None,
    );
    match result {
        Err(err) => {
            let msg = err.to_string();
            assert!(msg.contains("(2, 2)"), "message was: {}", msg);
            assert!(msg.contains("(1, 2)"), "message was: {}", msg);
        }
        Ok(_) => panic!("Expected shape mismatch"),
    }
}
