use bevy::prelude::*;
use constants::render_settings::MAX_SMOOTHING_ITERATIONS;

use crate::engine::core::settings::{BaselineSettings, OpacitySettings};

const WEIGHT_STEP: f32 = 0.01;

/// Applies one key press to the settings. Returns true when anything changed.
pub fn apply_parameter_key(
    settings: &mut OpacitySettings,
    baseline: &OpacitySettings,
    key: KeyCode,
) -> bool {
    let before = settings.clone();
    match key {
        KeyCode::ArrowUp => {
            settings.laplace_weight = (settings.laplace_weight + WEIGHT_STEP).min(1.0);
        }
        KeyCode::ArrowDown => {
            settings.laplace_weight = (settings.laplace_weight - WEIGHT_STEP).max(0.0);
        }
        KeyCode::ArrowRight => {
            settings.fade_to_alpha = (settings.fade_to_alpha + WEIGHT_STEP).min(1.0);
        }
        KeyCode::ArrowLeft => {
            settings.fade_to_alpha = (settings.fade_to_alpha - WEIGHT_STEP).max(0.0);
        }
        KeyCode::PageUp => {
            settings.smoothing_iterations =
                (settings.smoothing_iterations + 1).min(MAX_SMOOTHING_ITERATIONS);
        }
        KeyCode::PageDown => {
            settings.smoothing_iterations = settings.smoothing_iterations.saturating_sub(1);
        }
        KeyCode::KeyF => settings.solve_strategy = settings.solve_strategy.toggled(),
        KeyCode::KeyH => settings.shrink_compensation = !settings.shrink_compensation,
        KeyCode::Backspace => *settings = baseline.clone(),
        _ => {}
    }
    *settings != before
}

pub fn parameter_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    baseline: Res<BaselineSettings>,
    mut settings: ResMut<OpacitySettings>,
) {
    let mut next = settings.clone();
    let mut changed = false;
    for &key in keyboard.get_just_pressed() {
        changed |= apply_parameter_key(&mut next, &baseline.0, key);
    }

    // Only touch the resource on change so extraction stays idle
    if changed {
        info!(
            "laplace {:.2}, fade {:.2}, iterations {}, shrink {}, solve {}",
            next.laplace_weight,
            next.fade_to_alpha,
            next.smoothing_iterations,
            next.shrink_compensation,
            next.solve_strategy.label()
        );
        *settings = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_stay_in_unit_range() {
        let baseline = OpacitySettings::default();
        let mut settings = baseline.clone();
        settings.laplace_weight = 0.995;
        assert!(apply_parameter_key(&mut settings, &baseline, KeyCode::ArrowUp));
        assert_eq!(settings.laplace_weight, 1.0);
        assert!(!apply_parameter_key(&mut settings, &baseline, KeyCode::ArrowUp));

        settings.fade_to_alpha = 0.0;
        assert!(!apply_parameter_key(&mut settings, &baseline, KeyCode::ArrowLeft));
    }

    #[test]
    fn backspace_restores_baseline() {
        let baseline = OpacitySettings::default();
        let mut settings = baseline.clone();
        apply_parameter_key(&mut settings, &baseline, KeyCode::KeyF);
        apply_parameter_key(&mut settings, &baseline, KeyCode::PageDown);
        assert_ne!(settings, baseline);

        assert!(apply_parameter_key(&mut settings, &baseline, KeyCode::Backspace));
        assert_eq!(settings, baseline);
    }
}
