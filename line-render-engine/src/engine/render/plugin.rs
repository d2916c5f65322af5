use bevy::{
    core_pipeline::core_3d::graph::{Core3d, Node3d},
    prelude::*,
    render::{
        Render, RenderApp, RenderSet,
        extract_component::ExtractComponentPlugin,
        extract_resource::ExtractResourcePlugin,
        render_graph::{RenderGraphApp, ViewNodeRunner},
    },
};

use crate::engine::core::settings::OpacitySettings;
use crate::engine::loading::line_set_loader::LoadedLineSet;
use crate::engine::opacity::ping_pong::{FramePlan, PingPong};
use crate::engine::render::bind_groups::{plan_opacity_frame, prepare_opacity_bind_groups};
use crate::engine::render::extraction::{OpacityCamera, RenderFailure, exit_on_render_failure};
use crate::engine::render::frame_resources::prepare_frame_resources;
use crate::engine::render::geometry_buffers::prepare_line_geometry;
use crate::engine::render::node::{OpacityOptimizationLabel, OpacityOptimizationNode};
use crate::engine::render::pipelines::{OpacityPipelines, check_pipeline_failures};

pub struct OpacityOptimizationPlugin;

impl Plugin for OpacityOptimizationPlugin {
    fn build(&self, app: &mut App) {
        let failure = RenderFailure::default();

        app.init_resource::<OpacitySettings>()
            .init_resource::<LoadedLineSet>()
            .insert_resource(failure.clone())
            .add_plugins((
                ExtractResourcePlugin::<OpacitySettings>::default(),
                ExtractResourcePlugin::<LoadedLineSet>::default(),
                ExtractComponentPlugin::<OpacityCamera>::default(),
            ))
            .add_systems(Update, exit_on_render_failure);

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .insert_resource(failure)
            .init_resource::<PingPong>()
            .init_resource::<FramePlan>()
            .add_systems(
                Render,
                (
                    check_pipeline_failures,
                    prepare_line_geometry,
                    prepare_frame_resources,
                    plan_opacity_frame,
                )
                    .chain()
                    .in_set(RenderSet::PrepareResources),
            )
            .add_systems(
                Render,
                prepare_opacity_bind_groups.in_set(RenderSet::PrepareBindGroups),
            )
            .add_render_graph_node::<ViewNodeRunner<OpacityOptimizationNode>>(
                Core3d,
                OpacityOptimizationLabel,
            )
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::MainTransparentPass,
                    OpacityOptimizationLabel,
                    Node3d::EndMainPass,
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app.init_resource::<OpacityPipelines>();
    }
}
