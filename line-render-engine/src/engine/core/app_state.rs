use bevy::prelude::*;

use crate::engine::loading::line_set_loader::LoadedLineSet;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    AssetsLoaded,
    Running,
}

#[derive(Component)]
pub struct HudText;

// Transition to AssetsLoaded once the line set reached the render world
pub fn transition_to_assets_loaded(
    loaded: Res<LoadedLineSet>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loaded.line_set.is_some() {
        info!("→ Transitioning to AssetsLoaded state");
        next_state.set(AppState::AssetsLoaded);
    }
}

pub fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("→ All systems ready, transitioning to Running state");
    next_state.set(AppState::Running);
}
