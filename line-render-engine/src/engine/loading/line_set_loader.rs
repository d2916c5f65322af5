use std::sync::Arc;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::extract_resource::ExtractResource;
use constants::line_set::PreparedLineSet;

use crate::engine::core::settings::ActiveDataset;

#[derive(Resource, Default)]
pub struct LineSetLoader {
    handle: Option<Handle<PreparedLineSet>>,
}

/// The validated line set, shared with the render world.
///
/// The render world compares the `Arc` by pointer to decide whether the
/// geometry buffers must be rebuilt.
#[derive(Resource, Default, Clone, ExtractResource)]
pub struct LoadedLineSet {
    pub line_set: Option<Arc<PreparedLineSet>>,
}

// Start the loading process
pub fn start_loading(
    mut loader: ResMut<LineSetLoader>,
    asset_server: Res<AssetServer>,
    dataset: Res<ActiveDataset>,
) {
    info!(
        "Loading {} line set from {}",
        dataset.0.name, dataset.0.asset_path
    );
    loader.handle = Some(asset_server.load(dataset.0.asset_path));
}

pub fn check_line_set_loading(
    loader: Res<LineSetLoader>,
    asset_server: Res<AssetServer>,
    line_sets: Res<Assets<PreparedLineSet>>,
    dataset: Res<ActiveDataset>,
    mut loaded: ResMut<LoadedLineSet>,
    mut exit: EventWriter<AppExit>,
) {
    if loaded.line_set.is_some() {
        return;
    }
    let Some(handle) = &loader.handle else {
        return;
    };

    if let LoadState::Failed(err) = asset_server.load_state(handle.id()) {
        error!("Failed to load {}: {err}", dataset.0.asset_path);
        exit.write(AppExit::error());
        return;
    }

    let Some(line_set) = line_sets.get(handle) else {
        return;
    };

    if let Err(err) = line_set.validate() {
        error!("Invalid line set {}: {err}", dataset.0.asset_path);
        exit.write(AppExit::error());
        return;
    }

    if line_set.control_point_count() != dataset.0.control_point_budget as usize {
        warn!(
            "{} was prepared with {} control points, preset expects {}",
            dataset.0.asset_path,
            line_set.control_point_count(),
            dataset.0.control_point_budget
        );
    }

    info!(
        "✓ Line set loaded: {} lines, {} vertices, {} control points",
        line_set.line_count(),
        line_set.vertex_count(),
        line_set.control_point_count()
    );
    loaded.line_set = Some(Arc::new(line_set.clone()));
}
