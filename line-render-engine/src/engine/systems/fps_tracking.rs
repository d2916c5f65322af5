use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::WINDOW_TITLE;

use crate::engine::core::app_state::HudText;
use crate::engine::core::settings::OpacitySettings;

fn smoothed_fps(diagnostics: &DiagnosticsStore) -> Option<f64> {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
}

pub fn hud_text(fps: f64, settings: &OpacitySettings) -> String {
    format!(
        "FPS: {fps:.1}\n\
         solve: {}\n\
         laplace: {:.2} x{}{}\n\
         fade: {:.2}",
        settings.solve_strategy.label(),
        settings.laplace_weight,
        settings.smoothing_iterations,
        if settings.shrink_compensation {
            " (shrink)"
        } else {
            ""
        },
        settings.fade_to_alpha,
    )
}

pub fn fps_title_system(
    diagnostics: Res<DiagnosticsStore>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last_update_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    // Update the title every 0.5 seconds
    if current_time - *last_update_time < 0.5 {
        return;
    }
    if let (Some(fps), Ok(mut window)) = (smoothed_fps(&diagnostics), windows.single_mut()) {
        window.title = format!("{WINDOW_TITLE} - {fps:.1} fps");
        *last_update_time = current_time;
    }
}

pub fn hud_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    settings: Res<OpacitySettings>,
    mut query: Query<&mut Text, With<HudText>>,
) {
    let Some(fps) = smoothed_fps(&diagnostics) else {
        return;
    };
    for mut text in &mut query {
        text.0 = hud_text(fps, &settings);
    }
}
