use bevy::{
    ecs::query::QueryItem,
    prelude::*,
    render::{
        render_graph::{NodeRunError, RenderGraphContext, RenderLabel, ViewNode},
        render_resource::{
            ComputePassDescriptor, LoadOp, Operations, PipelineCache,
            RenderPassColorAttachment, RenderPassDescriptor, StoreOp,
        },
        renderer::RenderContext,
        view::ViewTarget,
    },
};

use crate::engine::core::settings::SolveStrategy;
use crate::engine::render::bind_groups::OpacityBindGroups;
use crate::engine::render::extraction::OpacityCamera;
use crate::engine::render::frame_resources::OpacityFrameResources;
use crate::engine::render::pipelines::OpacityPipelines;

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
pub struct OpacityOptimizationLabel;

/// Runs the whole opacity optimisation for one view:
/// low resolution lists, solve, smoothing, fade, full resolution lists and
/// the composite onto the view target.
#[derive(Default)]
pub struct OpacityOptimizationNode;

impl ViewNode for OpacityOptimizationNode {
    type ViewQuery = (&'static ViewTarget, &'static OpacityCamera);

    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (view_target, _camera): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        let (Some(bind_groups), Some(frame)) = (
            world.get_resource::<OpacityBindGroups>(),
            world.get_resource::<OpacityFrameResources>(),
        ) else {
            return Ok(());
        };
        let pipeline_cache = world.resource::<PipelineCache>();
        let Some(pipelines) = world.resource::<OpacityPipelines>().ready(pipeline_cache) else {
            return Ok(());
        };

        // Reset low resolution lists and the gather target
        {
            let encoder = render_context.command_encoder();
            encoder.clear_buffer(&frame.low_counter.buffer, 0, None);

            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("opacity_reset_low_res_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipelines.fill);
            for fill in [&bind_groups.reset_low_heads, &bind_groups.reset_gather] {
                pass.set_bind_group(0, &fill.bind_group, &[]);
                pass.dispatch_workgroups(fill.workgroups, 1, 1);
            }
        }

        // Low resolution list build
        {
            let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
                label: Some("opacity_build_low_res_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &frame.low_res_target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Default::default()),
                        store: StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_render_pipeline(pipelines.build_low_res);
            pass.set_bind_group(0, &bind_groups.frame, &[]);
            pass.set_bind_group(1, &bind_groups.low_geometry, &[]);
            pass.set_bind_group(2, &bind_groups.low_lists, &[]);
            pass.draw(0..bind_groups.segment_vertices, 0..1);
        }

        // Solve, smoothing and fade
        {
            let encoder = render_context.command_encoder();
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("opacity_solve_pass"),
                timestamp_writes: None,
            });

            let tiles = bind_groups.pixel_workgroups;
            match bind_groups.strategy {
                SolveStrategy::LinkedList => {
                    pass.set_pipeline(pipelines.solve);
                    pass.set_bind_group(0, &bind_groups.solve, &[]);
                    pass.dispatch_workgroups(tiles.x, tiles.y, 1);
                }
                SolveStrategy::Fourier => {
                    pass.set_bind_group(0, &bind_groups.fourier, &[]);
                    pass.set_pipeline(pipelines.fourier_accumulate);
                    pass.dispatch_workgroups(tiles.x, tiles.y, 1);
                    pass.set_pipeline(pipelines.fourier_solve);
                    pass.dispatch_workgroups(tiles.x, tiles.y, 1);
                }
            }

            pass.set_pipeline(pipelines.smooth);
            for step in &bind_groups.smoothing {
                pass.set_bind_group(0, step, &[]);
                pass.dispatch_workgroups(bind_groups.control_point_workgroups, 1, 1);
            }

            pass.set_pipeline(pipelines.fade);
            pass.set_bind_group(0, &bind_groups.fade, &[]);
            pass.dispatch_workgroups(bind_groups.vertex_workgroups, 1, 1);
        }

        // Reset full resolution lists
        {
            let encoder = render_context.command_encoder();
            encoder.clear_buffer(&frame.hq_counter.buffer, 0, None);

            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("opacity_reset_hq_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipelines.fill);
            let fill = &bind_groups.reset_hq_heads;
            pass.set_bind_group(0, &fill.bind_group, &[]);
            pass.dispatch_workgroups(fill.workgroups, 1, 1);
        }

        // Full resolution list build, colour writes are masked off
        {
            let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
                label: Some("opacity_build_hq_pass"),
                color_attachments: &[Some(view_target.get_color_attachment())],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_render_pipeline(pipelines.build_hq);
            pass.set_bind_group(0, &bind_groups.frame, &[]);
            pass.set_bind_group(1, &bind_groups.hq_geometry, &[]);
            pass.set_bind_group(2, &bind_groups.hq_lists, &[]);
            pass.draw(0..bind_groups.segment_vertices, 0..1);
        }

        // Sort and composite
        {
            let mut pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
                label: Some("opacity_composite_pass"),
                color_attachments: &[Some(view_target.get_color_attachment())],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_render_pipeline(pipelines.composite);
            pass.set_bind_group(0, &bind_groups.composite, &[]);
            pass.draw(0..3, 0..1);
        }

        Ok(())
    }
}
