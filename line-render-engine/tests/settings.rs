use std::io::Write;

use constants::datasets::{HELI, TORNADO};
use constants::render_settings::{MAX_RESOLUTION_DOWN_SCALE, MAX_SMOOTHING_ITERATIONS};
use line_render_engine::engine::core::settings::{
    LaunchOptions, OpacitySettings, SettingsError, SolveStrategy,
};
use tempfile::NamedTempFile;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn launch_options_pick_preset_and_settings_file() {
    let options = LaunchOptions::from_args(&args(&["2", "override.json"]));
    assert_eq!(options.preset_index, 2);
    assert_eq!(options.dataset(), &HELI);
    assert_eq!(
        options.settings_path.as_deref(),
        Some(std::path::Path::new("override.json"))
    );

    let defaults = LaunchOptions::from_args(&[]);
    assert_eq!(defaults.dataset(), &TORNADO);
    assert!(defaults.settings_path.is_none());
}

#[test]
fn unknown_preset_falls_back_to_the_tornado() {
    assert_eq!(LaunchOptions::from_args(&args(&["7"])).dataset(), &TORNADO);
    assert_eq!(LaunchOptions::from_args(&args(&["heli"])).dataset(), &TORNADO);
}

#[test]
fn settings_file_overrides_the_preset() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "laplace_weight": 0.4, "solve_strategy": "fourier", "shrink_compensation": false }}"#
    )
    .unwrap();

    let options = LaunchOptions {
        preset_index: 2,
        settings_path: Some(file.path().to_path_buf()),
    };
    let settings = options.resolve_settings().unwrap();
    let preset = OpacitySettings::from_preset(&HELI);

    assert_eq!(settings.laplace_weight, 0.4);
    assert_eq!(settings.solve_strategy, SolveStrategy::Fourier);
    assert!(!settings.shrink_compensation);
    assert_eq!(settings.q, preset.q);
    assert_eq!(settings.lambda, preset.lambda);
}

#[test]
fn out_of_range_values_are_clamped() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "fade_to_alpha": 3.0,
            "smoothing_iterations": 100000,
            "resolution_down_scale": 0,
            "q": -1.0
        }}"#
    )
    .unwrap();

    let settings = LaunchOptions {
        preset_index: 0,
        settings_path: Some(file.path().to_path_buf()),
    }
    .resolve_settings()
    .unwrap();

    assert_eq!(settings.fade_to_alpha, 1.0);
    assert_eq!(settings.smoothing_iterations, MAX_SMOOTHING_ITERATIONS);
    assert_eq!(settings.resolution_down_scale, 1);
    assert_eq!(settings.q, 0.0);

    let coarse = OpacitySettings {
        resolution_down_scale: 64,
        ..OpacitySettings::default()
    }
    .sanitized();
    assert_eq!(coarse.resolution_down_scale, MAX_RESOLUTION_DOWN_SCALE);
}

#[test]
fn missing_settings_file_reports_its_path() {
    let options = LaunchOptions {
        preset_index: 0,
        settings_path: Some("does/not/exist.json".into()),
    };
    match options.resolve_settings() {
        Err(SettingsError::Io { path, .. }) => assert!(path.ends_with("exist.json")),
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn malformed_settings_file_is_a_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ \"q\": ").unwrap();

    let result = LaunchOptions {
        preset_index: 0,
        settings_path: Some(file.path().to_path_buf()),
    }
    .resolve_settings();
    assert!(matches!(result, Err(SettingsError::Parse(_))));
}

#[test]
fn bundled_settings_file_parses() {
    let text = include_str!("../assets/settings/soft_fourier.settings.json");
    let mut settings = OpacitySettings::default();
    line_render_engine::engine::core::settings::SettingsOverride::from_json(text)
        .unwrap()
        .apply(&mut settings);
    assert_eq!(settings.solve_strategy, SolveStrategy::Fourier);
    assert_eq!(settings.resolution_down_scale, 2);
}
