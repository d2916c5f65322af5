use std::num::NonZeroU64;

use bevy::{
    core_pipeline::fullscreen_vertex_shader::fullscreen_shader_vertex_state,
    prelude::*,
    render::{
        render_resource::{
            binding_types::{
                storage_buffer_read_only_sized, storage_buffer_sized, uniform_buffer_sized,
            },
            *,
        },
        renderer::RenderDevice,
    },
};

use crate::engine::opacity::gpu_layout::{FadeParams, FillParams, FrameUniform, SmoothParams};
use crate::engine::render::extraction::RenderFailure;

const TYPES_SHADER_PATH: &str = "shaders/opacity_types.wgsl";
const FILL_SHADER_PATH: &str = "shaders/fill_u32.wgsl";
const BUILD_LOW_RES_SHADER_PATH: &str = "shaders/build_lists_low_res.wgsl";
const SOLVE_SHADER_PATH: &str = "shaders/solve_low_res.wgsl";
const FOURIER_SHADER_PATH: &str = "shaders/fourier_solve.wgsl";
const SMOOTH_SHADER_PATH: &str = "shaders/smooth_alpha.wgsl";
const FADE_SHADER_PATH: &str = "shaders/fade_to_vertex.wgsl";
const BUILD_HQ_SHADER_PATH: &str = "shaders/build_lists_hq.wgsl";
const COMPOSITE_SHADER_PATH: &str = "shaders/composite.wgsl";

/// Texture format of the list building target in the low resolution pass.
/// Nothing is written to it.
pub const LOW_RES_TARGET_FORMAT: TextureFormat = TextureFormat::R8Unorm;

fn uniform_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

/// Bind group layouts and cached pipeline ids for every opacity pass.
#[derive(Resource)]
pub struct OpacityPipelines {
    pub fill_layout: BindGroupLayout,
    pub frame_layout: BindGroupLayout,
    pub low_geometry_layout: BindGroupLayout,
    pub hq_geometry_layout: BindGroupLayout,
    pub list_append_layout: BindGroupLayout,
    pub solve_layout: BindGroupLayout,
    pub fourier_layout: BindGroupLayout,
    pub smooth_layout: BindGroupLayout,
    pub fade_layout: BindGroupLayout,
    pub composite_layout: BindGroupLayout,

    pub fill: CachedComputePipelineId,
    pub build_low_res: CachedRenderPipelineId,
    pub solve: CachedComputePipelineId,
    pub fourier_accumulate: CachedComputePipelineId,
    pub fourier_solve: CachedComputePipelineId,
    pub smooth: CachedComputePipelineId,
    pub fade: CachedComputePipelineId,
    pub build_hq: CachedRenderPipelineId,
    pub composite: CachedRenderPipelineId,

    // Keeps the shared import module loaded for the composer.
    _types_shader: Handle<Shader>,
}

/// Every pipeline resolved from the cache for one frame.
pub struct ReadyPipelines<'a> {
    pub fill: &'a ComputePipeline,
    pub build_low_res: &'a RenderPipeline,
    pub solve: &'a ComputePipeline,
    pub fourier_accumulate: &'a ComputePipeline,
    pub fourier_solve: &'a ComputePipeline,
    pub smooth: &'a ComputePipeline,
    pub fade: &'a ComputePipeline,
    pub build_hq: &'a RenderPipeline,
    pub composite: &'a RenderPipeline,
}

impl OpacityPipelines {
    /// None until every pipeline has compiled.
    pub fn ready<'a>(&self, pipeline_cache: &'a PipelineCache) -> Option<ReadyPipelines<'a>> {
        Some(ReadyPipelines {
            fill: pipeline_cache.get_compute_pipeline(self.fill)?,
            build_low_res: pipeline_cache.get_render_pipeline(self.build_low_res)?,
            solve: pipeline_cache.get_compute_pipeline(self.solve)?,
            fourier_accumulate: pipeline_cache.get_compute_pipeline(self.fourier_accumulate)?,
            fourier_solve: pipeline_cache.get_compute_pipeline(self.fourier_solve)?,
            smooth: pipeline_cache.get_compute_pipeline(self.smooth)?,
            fade: pipeline_cache.get_compute_pipeline(self.fade)?,
            build_hq: pipeline_cache.get_render_pipeline(self.build_hq)?,
            composite: pipeline_cache.get_render_pipeline(self.composite)?,
        })
    }

    /// First pipeline that failed to compile, with the cache's error.
    pub fn first_error(&self, pipeline_cache: &PipelineCache) -> Option<(&'static str, String)> {
        let compute = [
            ("fill", self.fill),
            ("solve", self.solve),
            ("fourier_accumulate", self.fourier_accumulate),
            ("fourier_solve", self.fourier_solve),
            ("smooth", self.smooth),
            ("fade", self.fade),
        ];
        let render = [
            ("build_low_res", self.build_low_res),
            ("build_hq", self.build_hq),
            ("composite", self.composite),
        ];

        compute
            .into_iter()
            .find_map(|(name, id)| match pipeline_cache.get_compute_pipeline_state(id) {
                CachedPipelineState::Err(err) => Some((name, err.to_string())),
                _ => None,
            })
            .or_else(|| {
                render.into_iter().find_map(|(name, id)| {
                    match pipeline_cache.get_render_pipeline_state(id) {
                        CachedPipelineState::Err(err) => Some((name, err.to_string())),
                        _ => None,
                    }
                })
            })
    }
}

pub fn check_pipeline_failures(
    pipelines: Res<OpacityPipelines>,
    pipeline_cache: Res<PipelineCache>,
    failure: Res<RenderFailure>,
) {
    if failure.is_raised() {
        return;
    }
    if let Some((name, err)) = pipelines.first_error(&pipeline_cache) {
        error!("Opacity pipeline '{name}' failed to compile: {err}");
        failure.raise();
    }
}

fn compute_descriptor(
    label: &'static str,
    layout: &BindGroupLayout,
    shader: Handle<Shader>,
    entry_point: &'static str,
) -> ComputePipelineDescriptor {
    ComputePipelineDescriptor {
        label: Some(label.into()),
        layout: vec![layout.clone()],
        push_constant_ranges: vec![],
        shader,
        shader_defs: vec![],
        entry_point: entry_point.into(),
        zero_initialize_workgroup_memory: false,
    }
}

/// Ribbon rasterisation that only appends to fragment lists.
fn list_building_descriptor(
    label: &'static str,
    layouts: Vec<BindGroupLayout>,
    shader: Handle<Shader>,
    format: TextureFormat,
) -> RenderPipelineDescriptor {
    RenderPipelineDescriptor {
        label: Some(label.into()),
        layout: layouts,
        push_constant_ranges: vec![],
        vertex: VertexState {
            shader: shader.clone(),
            shader_defs: vec![],
            entry_point: "vertex".into(),
            buffers: vec![],
        },
        fragment: Some(FragmentState {
            shader,
            shader_defs: vec![],
            entry_point: "fragment".into(),
            targets: vec![Some(ColorTargetState {
                format,
                blend: None,
                write_mask: ColorWrites::empty(),
            })],
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..default()
        },
        depth_stencil: None,
        multisample: MultisampleState::default(),
        zero_initialize_workgroup_memory: false,
    }
}

impl FromWorld for OpacityPipelines {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        let fill_layout = render_device.create_bind_group_layout(
            "opacity_fill_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::COMPUTE,
                (
                    uniform_buffer_sized(false, uniform_size::<FillParams>()),
                    storage_buffer_sized(false, None),
                ),
            ),
        );

        let frame_layout = render_device.create_bind_group_layout(
            "opacity_frame_bind_group_layout",
            &BindGroupLayoutEntries::single(
                ShaderStages::VERTEX_FRAGMENT,
                uniform_buffer_sized(false, uniform_size::<FrameUniform>()),
            ),
        );

        // positions, line ids, blend weights, importance
        let low_geometry_layout = render_device.create_bind_group_layout(
            "opacity_low_res_geometry_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::VERTEX,
                (
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                ),
            ),
        );

        // positions, line ids, current alpha
        let hq_geometry_layout = render_device.create_bind_group_layout(
            "opacity_hq_geometry_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::VERTEX,
                (
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                ),
            ),
        );

        // heads, nodes, counter
        let list_append_layout = render_device.create_bind_group_layout(
            "opacity_list_append_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::FRAGMENT,
                (
                    storage_buffer_sized(false, None),
                    storage_buffer_sized(false, None),
                    storage_buffer_sized(false, None),
                ),
            ),
        );

        let solve_layout = render_device.create_bind_group_layout(
            "opacity_solve_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::COMPUTE,
                (
                    uniform_buffer_sized(false, uniform_size::<FrameUniform>()),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_sized(false, None),
                ),
            ),
        );

        let fourier_layout = render_device.create_bind_group_layout(
            "opacity_fourier_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::COMPUTE,
                (
                    uniform_buffer_sized(false, uniform_size::<FrameUniform>()),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_sized(false, None),
                    storage_buffer_sized(false, None),
                ),
            ),
        );

        let smooth_layout = render_device.create_bind_group_layout(
            "opacity_smooth_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::COMPUTE,
                (
                    uniform_buffer_sized(false, uniform_size::<SmoothParams>()),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                ),
            ),
        );

        let fade_layout = render_device.create_bind_group_layout(
            "opacity_fade_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::COMPUTE,
                (
                    uniform_buffer_sized(false, uniform_size::<FadeParams>()),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_sized(false, None),
                ),
            ),
        );

        let composite_layout = render_device.create_bind_group_layout(
            "opacity_composite_bind_group_layout",
            &BindGroupLayoutEntries::sequential(
                ShaderStages::FRAGMENT,
                (
                    uniform_buffer_sized(false, uniform_size::<FrameUniform>()),
                    storage_buffer_read_only_sized(false, None),
                    storage_buffer_read_only_sized(false, None),
                ),
            ),
        );

        let types_shader = world.load_asset(TYPES_SHADER_PATH);
        let fill_shader = world.load_asset(FILL_SHADER_PATH);
        let build_low_res_shader = world.load_asset(BUILD_LOW_RES_SHADER_PATH);
        let solve_shader = world.load_asset(SOLVE_SHADER_PATH);
        let fourier_shader: Handle<Shader> = world.load_asset(FOURIER_SHADER_PATH);
        let smooth_shader = world.load_asset(SMOOTH_SHADER_PATH);
        let fade_shader = world.load_asset(FADE_SHADER_PATH);
        let build_hq_shader = world.load_asset(BUILD_HQ_SHADER_PATH);
        let composite_shader = world.load_asset(COMPOSITE_SHADER_PATH);

        let pipeline_cache = world.resource_mut::<PipelineCache>();

        let fill = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_fill_pipeline",
            &fill_layout,
            fill_shader,
            "fill",
        ));
        let solve = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_solve_pipeline",
            &solve_layout,
            solve_shader,
            "solve",
        ));
        let fourier_accumulate = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_fourier_accumulate_pipeline",
            &fourier_layout,
            fourier_shader.clone(),
            "accumulate",
        ));
        let fourier_solve = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_fourier_solve_pipeline",
            &fourier_layout,
            fourier_shader,
            "solve",
        ));
        let smooth = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_smooth_pipeline",
            &smooth_layout,
            smooth_shader,
            "diffuse",
        ));
        let fade = pipeline_cache.queue_compute_pipeline(compute_descriptor(
            "opacity_fade_pipeline",
            &fade_layout,
            fade_shader,
            "fade",
        ));

        let build_low_res = pipeline_cache.queue_render_pipeline(list_building_descriptor(
            "opacity_build_low_res_pipeline",
            vec![
                frame_layout.clone(),
                low_geometry_layout.clone(),
                list_append_layout.clone(),
            ],
            build_low_res_shader,
            LOW_RES_TARGET_FORMAT,
        ));
        let build_hq = pipeline_cache.queue_render_pipeline(list_building_descriptor(
            "opacity_build_hq_pipeline",
            vec![
                frame_layout.clone(),
                hq_geometry_layout.clone(),
                list_append_layout.clone(),
            ],
            build_hq_shader,
            TextureFormat::bevy_default(),
        ));

        let composite = pipeline_cache.queue_render_pipeline(RenderPipelineDescriptor {
            label: Some("opacity_composite_pipeline".into()),
            layout: vec![composite_layout.clone()],
            vertex: fullscreen_shader_vertex_state(),
            fragment: Some(FragmentState {
                shader: composite_shader,
                shader_defs: vec![],
                entry_point: "fragment".into(),
                targets: vec![Some(ColorTargetState {
                    format: TextureFormat::bevy_default(),
                    blend: Some(BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            push_constant_ranges: vec![],
            zero_initialize_workgroup_memory: false,
        });

        Self {
            fill_layout,
            frame_layout,
            low_geometry_layout,
            hq_geometry_layout,
            list_append_layout,
            solve_layout,
            fourier_layout,
            smooth_layout,
            fade_layout,
            composite_layout,
            fill,
            build_low_res,
            solve,
            fourier_accumulate,
            fourier_solve,
            smooth,
            fade,
            build_hq,
            composite,
            _types_shader: types_shader,
        }
    }
}
