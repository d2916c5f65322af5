use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::render::extract_resource::ExtractResource;
use constants::datasets::{self, DatasetPreset};
use constants::render_settings::{
    DEFAULT_FADE_TO_ALPHA, DEFAULT_HALO_COLOR, DEFAULT_HALO_PORTION, DEFAULT_LAPLACE_WEIGHT,
    DEFAULT_LINE_COLOR, DEFAULT_RESOLUTION_DOWN_SCALE, MAX_RESOLUTION_DOWN_SCALE,
    MAX_SMOOTHING_ITERATIONS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the low resolution pass estimates the importance in front of and
/// behind each fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStrategy {
    /// Exact, sorts every pixel's fragment list.
    #[default]
    LinkedList,
    /// Fourier opacity mapping, sort free and approximate.
    Fourier,
}

impl SolveStrategy {
    pub fn toggled(self) -> Self {
        match self {
            SolveStrategy::LinkedList => SolveStrategy::Fourier,
            SolveStrategy::Fourier => SolveStrategy::LinkedList,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SolveStrategy::LinkedList => "linked lists",
            SolveStrategy::Fourier => "fourier",
        }
    }
}

/// Runtime opacity parameters, mirrored into the render world every time
/// they change.
#[derive(Resource, Debug, Clone, PartialEq, ExtractResource, Serialize, Deserialize)]
pub struct OpacitySettings {
    /// Penalty weight for clutter in front of a fragment.
    pub q: f32,
    /// Penalty weight for occlusion behind a fragment.
    pub r: f32,
    /// Importance exponent; higher keeps important lines opaque.
    pub lambda: f32,
    pub strip_width: f32,
    pub halo_portion: f32,
    pub line_color: [f32; 4],
    pub halo_color: [f32; 4],
    pub fade_to_alpha: f32,
    pub laplace_weight: f32,
    pub smoothing_iterations: u32,
    pub shrink_compensation: bool,
    pub resolution_down_scale: u32,
    pub solve_strategy: SolveStrategy,
}

impl OpacitySettings {
    pub fn from_preset(preset: &DatasetPreset) -> Self {
        Self {
            q: preset.q,
            r: preset.r,
            lambda: preset.lambda,
            strip_width: preset.strip_width,
            halo_portion: DEFAULT_HALO_PORTION,
            line_color: DEFAULT_LINE_COLOR,
            halo_color: DEFAULT_HALO_COLOR,
            fade_to_alpha: DEFAULT_FADE_TO_ALPHA,
            laplace_weight: DEFAULT_LAPLACE_WEIGHT,
            smoothing_iterations: preset.smoothing_iterations,
            shrink_compensation: true,
            resolution_down_scale: DEFAULT_RESOLUTION_DOWN_SCALE,
            solve_strategy: SolveStrategy::default(),
        }
    }

    /// Clamps every field into the range the kernels accept.
    pub fn sanitized(&self) -> Self {
        Self {
            q: self.q.max(0.0),
            r: self.r.max(0.0),
            lambda: self.lambda.max(0.0),
            strip_width: self.strip_width.max(1e-5),
            halo_portion: self.halo_portion.clamp(0.0, 1.0),
            line_color: self.line_color.map(|channel| channel.clamp(0.0, 1.0)),
            halo_color: self.halo_color.map(|channel| channel.clamp(0.0, 1.0)),
            fade_to_alpha: self.fade_to_alpha.clamp(0.0, 1.0),
            laplace_weight: self.laplace_weight.clamp(0.0, 1.0),
            smoothing_iterations: self.smoothing_iterations.min(MAX_SMOOTHING_ITERATIONS),
            shrink_compensation: self.shrink_compensation,
            resolution_down_scale: self
                .resolution_down_scale
                .clamp(1, MAX_RESOLUTION_DOWN_SCALE),
            solve_strategy: self.solve_strategy,
        }
    }
}

impl Default for OpacitySettings {
    fn default() -> Self {
        Self::from_preset(&datasets::TORNADO)
    }
}

/// Settings restored by the reset key.
#[derive(Resource, Debug, Clone)]
pub struct BaselineSettings(pub OpacitySettings);

/// Dataset selected at launch.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ActiveDataset(pub &'static DatasetPreset);

/// Partial settings read from a JSON file. Missing fields keep the preset value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverride {
    pub q: Option<f32>,
    pub r: Option<f32>,
    pub lambda: Option<f32>,
    pub strip_width: Option<f32>,
    pub halo_portion: Option<f32>,
    pub line_color: Option<[f32; 4]>,
    pub halo_color: Option<[f32; 4]>,
    pub fade_to_alpha: Option<f32>,
    pub laplace_weight: Option<f32>,
    pub smoothing_iterations: Option<u32>,
    pub shrink_compensation: Option<bool>,
    pub resolution_down_scale: Option<u32>,
    pub solve_strategy: Option<SolveStrategy>,
}

impl SettingsOverride {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn apply(&self, settings: &mut OpacitySettings) {
        macro_rules! apply_fields {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    settings.$field = value;
                })*
            };
        }

        apply_fields!(
            q,
            r,
            lambda,
            strip_width,
            halo_portion,
            line_color,
            halo_color,
            fade_to_alpha,
            laplace_weight,
            smoothing_iterations,
            shrink_compensation,
            resolution_down_scale,
            solve_strategy
        );
    }
}

/// Command line: `[preset 0|1|2] [settings.json]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchOptions {
    pub preset_index: usize,
    pub settings_path: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn from_args(args: &[String]) -> Self {
        let preset_index = args
            .first()
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(0);
        let settings_path = args.get(1).map(PathBuf::from);

        Self {
            preset_index,
            settings_path,
        }
    }

    pub fn dataset(&self) -> &'static DatasetPreset {
        datasets::preset(self.preset_index)
    }

    /// Preset settings with the optional override file applied.
    pub fn resolve_settings(&self) -> Result<OpacitySettings, SettingsError> {
        let mut settings = OpacitySettings::from_preset(self.dataset());
        if let Some(path) = &self.settings_path {
            SettingsOverride::load(path)?.apply(&mut settings);
        }
        Ok(settings.sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_keeps_missing_fields() {
        let mut settings = OpacitySettings::default();
        let before = settings.clone();
        SettingsOverride::from_json(r#"{ "q": 5.0, "solve_strategy": "fourier" }"#)
            .unwrap()
            .apply(&mut settings);

        assert_eq!(settings.q, 5.0);
        assert_eq!(settings.solve_strategy, SolveStrategy::Fourier);
        assert_eq!(settings.r, before.r);
        assert_eq!(settings.strip_width, before.strip_width);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SettingsOverride::from_json(r#"{ "laplace": 0.3 }"#).is_err());
    }
}
