use bevy::{
    prelude::*,
    render::{
        render_resource::{
            BindGroup, BindGroupEntries, BindGroupLayout, Buffer, BufferInitDescriptor,
            BufferUsages,
        },
        renderer::RenderDevice,
        view::ExtractedView,
    },
};
use bytemuck::Pod;
use constants::render_settings::{
    END_OF_LIST, PIXEL_TILE_SIZE, UNWRITTEN_ALPHA_BITS, WORKGROUP_SIZE,
};

use crate::engine::core::settings::{OpacitySettings, SolveStrategy};
use crate::engine::opacity::gpu_array::GpuArray;
use crate::engine::opacity::gpu_layout::{
    FadeParams, FillParams, FrameInputs, FrameUniform, SmoothParams, depth_range, workgroups_1d,
    workgroups_2d,
};
use crate::engine::opacity::ping_pong::{FramePlan, PingPong, plan_frame};
use crate::engine::render::extraction::OpacityCamera;
use crate::engine::render::frame_resources::OpacityFrameResources;
use crate::engine::render::geometry_buffers::LineGeometryBuffers;
use crate::engine::render::pipelines::OpacityPipelines;

/// Hardware cap on workgroups per dispatch dimension. The fill kernel
/// strides over anything beyond it.
const MAX_WORKGROUPS_PER_DIMENSION: u32 = 65_535;

/// A fill kernel dispatch.
pub struct FillDispatch {
    pub bind_group: BindGroup,
    pub workgroups: u32,
}

/// Everything the render node needs for one frame.
#[derive(Resource)]
pub struct OpacityBindGroups {
    pub reset_low_heads: FillDispatch,
    pub reset_gather: FillDispatch,
    pub reset_hq_heads: FillDispatch,
    pub frame: BindGroup,
    pub low_geometry: BindGroup,
    pub low_lists: BindGroup,
    pub hq_geometry: BindGroup,
    pub hq_lists: BindGroup,
    pub solve: BindGroup,
    pub fourier: BindGroup,
    pub smoothing: Vec<BindGroup>,
    pub fade: BindGroup,
    pub composite: BindGroup,
    pub strategy: SolveStrategy,
    pub pixel_workgroups: UVec2,
    pub control_point_workgroups: u32,
    pub vertex_workgroups: u32,
    pub segment_vertices: u32,
}

/// Advances the ping-pong state by one frame's smoothing schedule.
pub fn plan_opacity_frame(
    settings: Option<Res<OpacitySettings>>,
    mut ping_pong: ResMut<PingPong>,
    mut plan: ResMut<FramePlan>,
) {
    let Some(settings) = settings else {
        return;
    };
    let settings = settings.sanitized();
    let (next_plan, next_ping_pong) = plan_frame(
        *ping_pong,
        settings.smoothing_iterations,
        settings.laplace_weight,
        settings.shrink_compensation,
    );
    *plan = next_plan;
    *ping_pong = next_ping_pong;
}

fn uniform_buffer<T: Pod>(render_device: &RenderDevice, label: &str, value: &T) -> Buffer {
    render_device.create_buffer_with_data(&BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(value),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

fn fill_dispatch(
    render_device: &RenderDevice,
    layout: &BindGroupLayout,
    label: &str,
    target: &GpuArray,
    value: u32,
) -> FillDispatch {
    let params = uniform_buffer(
        render_device,
        label,
        &FillParams {
            value,
            count: target.len,
            _padding: [0; 2],
        },
    );
    FillDispatch {
        bind_group: render_device.create_bind_group(
            label,
            layout,
            &BindGroupEntries::sequential((params.as_entire_binding(), target.binding())),
        ),
        workgroups: workgroups_1d(target.len, WORKGROUP_SIZE).min(MAX_WORKGROUPS_PER_DIMENSION),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn prepare_opacity_bind_groups(
    mut commands: Commands,
    pipelines: Res<OpacityPipelines>,
    render_device: Res<RenderDevice>,
    geometry: Option<Res<LineGeometryBuffers>>,
    frame: Option<Res<OpacityFrameResources>>,
    settings: Option<Res<OpacitySettings>>,
    plan: Res<FramePlan>,
    views: Query<&ExtractedView, With<OpacityCamera>>,
) {
    let (Some(geometry), Some(frame), Some(settings), Ok(view)) =
        (geometry, frame, settings, views.single())
    else {
        commands.remove_resource::<OpacityBindGroups>();
        return;
    };
    let settings = settings.sanitized();

    let camera_position = view.world_from_view.translation();
    let view_from_world = view.world_from_view.compute_matrix().inverse();
    let clip_from_world = view
        .clip_from_world
        .unwrap_or(view.clip_from_view * view_from_world);
    let (center, radius) = geometry.bounding_sphere;

    let frame_uniform = FrameUniform::new(&FrameInputs {
        clip_from_world,
        view_from_world,
        camera_position,
        settings: &settings,
        extent: frame.extent,
        capacity: frame.capacity,
        control_point_count: geometry.control_point_count(),
        vertex_count: geometry.vertex_count(),
        depth_range: depth_range(camera_position, center, radius),
    });
    let frame_buffer = uniform_buffer(&render_device, "opacity_frame_uniform", &frame_uniform);

    let gather = &geometry.control_alpha[plan.gather];

    let smoothing = plan
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let params = uniform_buffer(
                &render_device,
                "opacity_smooth_params",
                &SmoothParams {
                    weight: step.weight,
                    count: geometry.control_point_count(),
                    _padding: [0; 2],
                },
            );
            let write = geometry.control_alpha[step.write].as_f32();
            render_device.create_bind_group(
                format!("opacity_smooth_bind_group_{index}").as_str(),
                &pipelines.smooth_layout,
                &BindGroupEntries::sequential((
                    params.as_entire_binding(),
                    geometry.control_alpha[step.read].binding(),
                    write.binding(),
                    geometry.control_point_line_ids.binding(),
                )),
            )
        })
        .collect();

    let fade_params = uniform_buffer(
        &render_device,
        "opacity_fade_params",
        &FadeParams {
            fade_to_alpha: settings.fade_to_alpha,
            vertex_count: geometry.vertex_count(),
            control_point_count: geometry.control_point_count(),
            _padding: 0,
        },
    );

    let bind_groups = OpacityBindGroups {
        reset_low_heads: fill_dispatch(
            &render_device,
            &pipelines.fill_layout,
            "opacity_reset_low_res_heads",
            &frame.low_heads,
            END_OF_LIST,
        ),
        reset_gather: fill_dispatch(
            &render_device,
            &pipelines.fill_layout,
            "opacity_reset_gather",
            gather,
            UNWRITTEN_ALPHA_BITS,
        ),
        reset_hq_heads: fill_dispatch(
            &render_device,
            &pipelines.fill_layout,
            "opacity_reset_hq_heads",
            &frame.hq_heads,
            END_OF_LIST,
        ),
        frame: render_device.create_bind_group(
            "opacity_frame_bind_group",
            &pipelines.frame_layout,
            &BindGroupEntries::single(frame_buffer.as_entire_binding()),
        ),
        low_geometry: render_device.create_bind_group(
            "opacity_low_res_geometry_bind_group",
            &pipelines.low_geometry_layout,
            &BindGroupEntries::sequential((
                geometry.positions.binding(),
                geometry.line_ids.binding(),
                geometry.blend_weights.binding(),
                geometry.importance.binding(),
            )),
        ),
        low_lists: render_device.create_bind_group(
            "opacity_low_res_lists_bind_group",
            &pipelines.list_append_layout,
            &BindGroupEntries::sequential((
                frame.low_heads.binding(),
                frame.low_nodes.binding(),
                frame.low_counter.binding(),
            )),
        ),
        hq_geometry: render_device.create_bind_group(
            "opacity_hq_geometry_bind_group",
            &pipelines.hq_geometry_layout,
            &BindGroupEntries::sequential((
                geometry.positions.binding(),
                geometry.line_ids.binding(),
                geometry.current_alpha.binding(),
            )),
        ),
        hq_lists: render_device.create_bind_group(
            "opacity_hq_lists_bind_group",
            &pipelines.list_append_layout,
            &BindGroupEntries::sequential((
                frame.hq_heads.binding(),
                frame.hq_nodes.binding(),
                frame.hq_counter.binding(),
            )),
        ),
        solve: render_device.create_bind_group(
            "opacity_solve_bind_group",
            &pipelines.solve_layout,
            &BindGroupEntries::sequential((
                frame_buffer.as_entire_binding(),
                frame.low_heads.binding(),
                frame.low_nodes.binding(),
                gather.binding(),
            )),
        ),
        fourier: render_device.create_bind_group(
            "opacity_fourier_bind_group",
            &pipelines.fourier_layout,
            &BindGroupEntries::sequential((
                frame_buffer.as_entire_binding(),
                frame.low_heads.binding(),
                frame.low_nodes.binding(),
                frame.fourier.binding(),
                gather.binding(),
            )),
        ),
        smoothing,
        fade: render_device.create_bind_group(
            "opacity_fade_bind_group",
            &pipelines.fade_layout,
            &BindGroupEntries::sequential((
                fade_params.as_entire_binding(),
                geometry.control_alpha[plan.fade_source].binding(),
                geometry.blend_weights.binding(),
                geometry.current_alpha.binding(),
            )),
        ),
        composite: render_device.create_bind_group(
            "opacity_composite_bind_group",
            &pipelines.composite_layout,
            &BindGroupEntries::sequential((
                frame_buffer.as_entire_binding(),
                frame.hq_heads.binding(),
                frame.hq_nodes.binding(),
            )),
        ),
        strategy: settings.solve_strategy,
        pixel_workgroups: workgroups_2d(frame.extent.low, PIXEL_TILE_SIZE),
        control_point_workgroups: workgroups_1d(geometry.control_point_count(), WORKGROUP_SIZE),
        vertex_workgroups: workgroups_1d(geometry.vertex_count(), WORKGROUP_SIZE),
        segment_vertices: geometry.segment_vertex_count(),
    };

    commands.insert_resource(bind_groups);
}
