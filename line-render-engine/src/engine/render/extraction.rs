use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use bevy::render::extract_component::ExtractComponent;

/// Marks the camera whose view target receives the opacity optimised lines.
#[derive(Component, Default, Clone, Copy, ExtractComponent)]
pub struct OpacityCamera;

/// Set by the render world when a pipeline fails to compile.
///
/// The same flag is inserted into both worlds so the main world can exit.
#[derive(Resource, Default, Clone)]
pub struct RenderFailure(Arc<AtomicBool>);

impl RenderFailure {
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub fn exit_on_render_failure(
    failure: Res<RenderFailure>,
    mut exit: EventWriter<AppExit>,
    mut reported: Local<bool>,
) {
    if failure.is_raised() && !*reported {
        *reported = true;
        error!("Opacity pipeline unavailable, shutting down");
        exit.write(AppExit::error());
    }
}
