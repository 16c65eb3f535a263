use std::path::PathBuf;

use kcor_core::error::KcorError;
use kcor_core::pipeline::config::{SensorGeometry, StackMethod, StreamConfig};
use kcor_core::pipeline::PipelineStage;

#[test]
fn test_default_config() {
    let config = StreamConfig::new(PathBuf::from("raw"), PathBuf::from("out"));
    assert_eq!(config.geometry, SensorGeometry::default());
    assert_eq!(config.geometry.height, 1024);
    assert_eq!(config.geometry.width, 1024);
    assert_eq!(config.geometry.cameras, 2);
    assert_eq!(config.geometry.states, 4);
    assert_eq!(config.geometry.adc_channels, 4);
    assert_eq!(config.geometry.exposures_per_file, 2);
    assert_eq!(config.stacking.method, StackMethod::AerosolFilter);
    assert!(config.results.write_removed_list);
    assert!(!config.results.overwrite);
    assert_eq!(config.luts.model, "Photonfocus_MV-D1024E");
    assert!(config.cores.is_none());
    config.validate().unwrap();
}

#[test]
fn test_geometry_file_sizes() {
    let g = SensorGeometry::default();
    assert_eq!(g.file_sample_count(), 2 * 4 * 1024 * 1024);
    assert_eq!(g.file_byte_len(), 16 * 1024 * 1024);
    assert_eq!(g.cube_byte_len(), 2 * 4 * 1024 * 1024 * 2);
}

#[test]
fn test_stack_method_display() {
    assert_eq!(StackMethod::AerosolFilter.to_string(), "Aerosol Filter");
    assert_eq!(StackMethod::Mean.to_string(), "Mean");
    assert_eq!(StackMethod::Median.to_string(), "Median");
}

#[test]
fn test_stage_display() {
    assert_eq!(PipelineStage::Filtering.to_string(), "Removing aerosols");
    assert_eq!(PipelineStage::Combining.to_string(), "Computing corona");
}

#[test]
fn test_config_serde_roundtrip() {
    let mut config = StreamConfig::new(PathBuf::from("/data/raw"), PathBuf::from("/data/out"));
    config.stacking.method = StackMethod::Median;
    config.filter.retention = 0.8;
    config.luts.identifier = "20200615".into();
    config.luts.camera_ids = vec!["1111".into(), "2222".into()];
    config.cores = Some(4);

    let json = serde_json::to_string(&config).unwrap();
    let back: StreamConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.stacking.method, StackMethod::Median);
    assert_eq!(back.filter, config.filter);
    assert_eq!(back.filter.noise_scale, 4.0 / 44.0);
    assert_eq!(back.luts.camera_ids, config.luts.camera_ids);
    assert_eq!(back.cores, Some(4));
}

#[test]
fn test_config_partial_sections_use_defaults() {
    let json = r#"{
        "stream_root": "raw",
        "output_root": "out",
        "geometry": { "height": 8, "width": 16 },
        "filter": { "retention": 0.75 }
    }"#;
    let config: StreamConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.geometry.height, 8);
    assert_eq!(config.geometry.width, 16);
    assert_eq!(config.geometry.states, 4);
    assert!((config.filter.retention - 0.75).abs() < 1e-12);
    assert!((config.filter.gain - 44.0).abs() < 1e-12);
    assert_eq!(config.stacking.method, StackMethod::AerosolFilter);
    assert!(config.results.write_removed_list);
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = StreamConfig::new(PathBuf::from("."), PathBuf::from("."));
    config.geometry.width = 0;
    assert!(matches!(config.validate(), Err(KcorError::Config(_))));

    let mut config = StreamConfig::new(PathBuf::from("."), PathBuf::from("."));
    config.geometry.code_domain = 70_000;
    assert!(matches!(config.validate(), Err(KcorError::Config(_))));

    let mut config = StreamConfig::new(PathBuf::from("."), PathBuf::from("."));
    config.filter.retention = -0.1;
    assert!(matches!(config.validate(), Err(KcorError::Config(_))));

    let mut config = StreamConfig::new(PathBuf::from("."), PathBuf::from("."));
    config.cores = Some(0);
    assert!(matches!(config.validate(), Err(KcorError::Config(_))));
}

#[test]
fn test_threshold_count() {
    let params = StreamConfig::new(PathBuf::new(), PathBuf::new()).filter;
    assert_eq!(params.threshold_count(20), 18);
    assert_eq!(params.threshold_count(10), 9);
    assert_eq!(params.threshold_count(7), 7);
    assert_eq!(params.threshold_count(1), 1);
}
