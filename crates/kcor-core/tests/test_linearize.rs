mod common;

use ndarray::Array5;

use common::{small_geometry, write_observation, write_scaled_luts};
use kcor_core::calibration::{linearize, lut_filename, LookupTable, LutSet};
use kcor_core::consts::DEFAULT_LUT_MODEL;
use kcor_core::error::KcorError;
use kcor_core::frame::RawFrameStack;
use kcor_core::io::RawFrameReader;
use kcor_core::pipeline::config::{LutConfig, SensorGeometry};

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

#[test]
fn test_identity_lut_preserves_codes() {
    let geometry = small_geometry(3, 8);
    let luts = LutSet::identity(&geometry);
    let raw = RawFrameStack::new(Array5::from_shape_fn((2, 2, 4, 3, 8), |(n, c, s, h, w)| {
        (n * 1000 + c * 500 + s * 100 + h * 10 + w) as u16
    }));

    let linear = linearize(&raw, &luts).unwrap();
    assert_eq!(linear.view().dim(), raw.view().dim());
    for (&l, &r) in linear.view().iter().zip(raw.view().iter()) {
        assert_eq!(l, u32::from(r));
    }
}

#[test]
fn test_each_camera_uses_its_own_tables() {
    let cam0 = vec![LookupTable::new((0..8u32).map(|v| v + 100).collect()); 2];
    let cam1 = vec![LookupTable::new((0..8u32).map(|v| v + 200).collect()); 2];
    let luts = LutSet::new(vec![cam0, cam1]).unwrap();
    let raw = RawFrameStack::new(Array5::from_elem((3, 2, 2, 2, 2), 5u16));

    let linear = linearize(&raw, &luts).unwrap();
    for ((_, c, _, _, _), &v) in linear.view().indexed_iter() {
        assert_eq!(v, if c == 0 { 105 } else { 205 });
    }
}

#[test]
fn test_code_outside_domain_is_out_of_range() {
    let geometry = SensorGeometry {
        code_domain: 16,
        ..small_geometry(2, 4)
    };
    let luts = LutSet::identity(&geometry);
    let raw = RawFrameStack::new(Array5::from_shape_fn((2, 2, 4, 2, 4), |(n, c, _, h, w)| {
        if n == 1 && c == 1 && h == 1 && w == 2 {
            20
        } else {
            3
        }
    }));

    match linearize(&raw, &luts).unwrap_err() {
        KcorError::OutOfRange { camera, channel, value, domain } => {
            assert_eq!(camera, 1);
            assert_eq!(channel, 2);
            assert_eq!(value, 20);
            assert_eq!(domain, 16);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn test_camera_count_mismatch() {
    let luts = LutSet::identity(&SensorGeometry {
        cameras: 1,
        ..small_geometry(2, 2)
    });
    let raw = RawFrameStack::new(Array5::zeros((1, 2, 4, 2, 2)));
    assert!(matches!(linearize(&raw, &luts), Err(KcorError::Config(_))));
}

#[test]
fn test_lut_set_rejects_uneven_tables() {
    let err = LutSet::new(vec![
        vec![LookupTable::identity(8); 2],
        vec![LookupTable::identity(8); 3],
    ])
    .unwrap_err();
    assert!(matches!(err, KcorError::Config(_)));

    let err = LutSet::new(vec![vec![LookupTable::identity(8), LookupTable::identity(4)]])
        .unwrap_err();
    assert!(matches!(err, KcorError::Config(_)));

    assert!(LutSet::new(Vec::new()).is_err());
}

// ---------------------------------------------------------------------------
// LUT files
// ---------------------------------------------------------------------------

#[test]
fn test_lut_filename() {
    assert_eq!(
        lut_filename(DEFAULT_LUT_MODEL, "1234", 2, "20200615"),
        "Photonfocus_MV-D1024E_1234_adc2_20200615.bin"
    );
}

#[test]
fn test_read_lut_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.bin");
    let bytes: Vec<u8> = (0..32u32).flat_map(|v| (v * 7).to_ne_bytes()).collect();
    std::fs::write(&path, bytes).unwrap();

    let table = LookupTable::read(&path, 32).unwrap();
    assert_eq!(table.len(), 32);
    assert_eq!(table.get(5), Some(35));
    assert_eq!(table.get(32), None);
}

#[test]
fn test_read_lut_wrong_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.bin");
    std::fs::write(&path, vec![0u8; 30 * 4]).unwrap();

    match LookupTable::read(&path, 32).unwrap_err() {
        KcorError::ShapeMismatch { expected, actual, .. } => {
            assert_eq!(expected, 128);
            assert_eq!(actual, 120);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn test_load_lut_set_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = SensorGeometry {
        code_domain: 64,
        ..small_geometry(2, 4)
    };
    write_scaled_luts(dir.path(), DEFAULT_LUT_MODEL, &["1111", "2222"], "20200615", &geometry, 3);

    let config = LutConfig {
        root: dir.path().to_path_buf(),
        identifier: "20200615".into(),
        camera_ids: vec!["1111".into(), "2222".into()],
        ..Default::default()
    };
    let luts = LutSet::load(&config, &geometry).unwrap();
    assert_eq!(luts.cameras(), 2);
    assert_eq!(luts.channels(), 4);
    assert_eq!(luts.domain(), 64);
    assert_eq!(luts.camera(1)[3].get(10), Some(30));
}

#[test]
fn test_load_lut_set_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = SensorGeometry {
        code_domain: 64,
        ..small_geometry(2, 4)
    };
    write_scaled_luts(dir.path(), DEFAULT_LUT_MODEL, &["1111"], "20200615", &geometry, 1);

    let config = LutConfig {
        root: dir.path().to_path_buf(),
        identifier: "20200615".into(),
        camera_ids: vec!["1111".into(), "2222".into()],
        ..Default::default()
    };
    assert!(matches!(
        LutSet::load(&config, &geometry),
        Err(KcorError::Io(_))
    ));
}

#[test]
fn test_load_lut_set_camera_id_count() {
    let config = LutConfig {
        camera_ids: vec!["1111".into()],
        ..Default::default()
    };
    assert!(matches!(
        LutSet::load(&config, &small_geometry(2, 4)),
        Err(KcorError::Config(_))
    ));
}

// ---------------------------------------------------------------------------
// Reader + LUT
// ---------------------------------------------------------------------------

#[test]
fn test_linearize_stream_files() {
    let dir = tempfile::tempdir().unwrap();
    let geometry = SensorGeometry {
        code_domain: 256,
        ..small_geometry(2, 4)
    };
    write_observation(dir.path(), "20201008_222714", &geometry, 4, |n, c, s, h, w| {
        (n * 40 + c * 20 + s * 4 + h * 2 + w % 2) as u16
    });
    write_scaled_luts(dir.path(), DEFAULT_LUT_MODEL, &["1111", "2222"], "x", &geometry, 5);
    let config = LutConfig {
        root: dir.path().to_path_buf(),
        identifier: "x".into(),
        camera_ids: vec!["1111".into(), "2222".into()],
        ..Default::default()
    };

    let reader = RawFrameReader::new(geometry);
    let files = reader.discover(dir.path(), "20201008_222714", None).unwrap();
    let raw = reader.load(&files).unwrap();
    let linear = linearize(&raw, &LutSet::load(&config, &geometry).unwrap()).unwrap();

    for (&l, &r) in linear.view().iter().zip(raw.view().iter()) {
        assert_eq!(l, u32::from(r) * 5);
    }
}
