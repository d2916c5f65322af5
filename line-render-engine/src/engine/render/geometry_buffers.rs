use std::sync::Arc;

use bevy::{
    prelude::*,
    render::{render_resource::BufferUsages, renderer::RenderDevice},
};
use constants::line_set::PreparedLineSet;
use constants::render_settings::UNWRITTEN_ALPHA_BITS;

use crate::engine::loading::line_set_loader::LoadedLineSet;
use crate::engine::opacity::gpu_array::{ElementKind, GpuArray};
use crate::engine::opacity::ping_pong::PingPong;

/// Static line data and the opacity state attached to it.
///
/// Lives as long as the loaded line set.
#[derive(Resource)]
pub struct LineGeometryBuffers {
    pub source: Arc<PreparedLineSet>,
    pub positions: GpuArray,
    pub line_ids: GpuArray,
    pub importance: GpuArray,
    pub blend_weights: GpuArray,
    /// Faded per-vertex opacity read by the full resolution list build.
    pub current_alpha: GpuArray,
    pub control_alpha: [GpuArray; 2],
    pub control_point_line_ids: GpuArray,
    pub bounding_sphere: (Vec3, f32),
}

impl LineGeometryBuffers {
    pub fn new(render_device: &RenderDevice, source: Arc<PreparedLineSet>) -> Self {
        let read_only = BufferUsages::STORAGE;
        let writable = BufferUsages::STORAGE | BufferUsages::COPY_DST;

        let vertex_count = source.vertex_count();
        let control_point_count = source.control_point_count();
        let unwritten = vec![UNWRITTEN_ALPHA_BITS; control_point_count];
        let control_alpha = [0, 1].map(|index| {
            GpuArray::with_data(
                render_device,
                &format!("opacity_control_alpha_{index}"),
                ElementKind::AlphaBits,
                &unwritten,
                writable,
            )
        });

        let (center, radius) = source.bounding_sphere();

        Self {
            positions: GpuArray::with_data(
                render_device,
                "line_positions",
                ElementKind::Position,
                &source.positions,
                read_only,
            ),
            line_ids: GpuArray::with_data(
                render_device,
                "line_ids",
                ElementKind::U32,
                &source.line_ids,
                read_only,
            ),
            importance: GpuArray::with_data(
                render_device,
                "line_importance",
                ElementKind::F32,
                &source.importance,
                read_only,
            ),
            blend_weights: GpuArray::with_data(
                render_device,
                "line_blend_weights",
                ElementKind::F32,
                &source.blend_weights,
                read_only,
            ),
            current_alpha: GpuArray::with_data(
                render_device,
                "line_current_alpha",
                ElementKind::F32,
                &vec![1.0f32; vertex_count],
                writable,
            ),
            control_alpha,
            control_point_line_ids: GpuArray::with_data(
                render_device,
                "control_point_line_ids",
                ElementKind::U32,
                &source.control_point_line_ids,
                read_only,
            ),
            bounding_sphere: (Vec3::from_array(center), radius),
            source,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len
    }

    pub fn control_point_count(&self) -> u32 {
        self.control_point_line_ids.len
    }

    /// Six ribbon vertices per segment between consecutive vertices.
    pub fn segment_vertex_count(&self) -> u32 {
        self.vertex_count().saturating_sub(1) * 6
    }
}

pub fn prepare_line_geometry(
    mut commands: Commands,
    loaded: Option<Res<LoadedLineSet>>,
    existing: Option<Res<LineGeometryBuffers>>,
    render_device: Res<RenderDevice>,
    mut ping_pong: ResMut<PingPong>,
) {
    let Some(line_set) = loaded.and_then(|loaded| loaded.line_set.clone()) else {
        return;
    };
    if existing.is_some_and(|existing| Arc::ptr_eq(&existing.source, &line_set)) {
        return;
    }

    info!(
        "Uploading line geometry: {} vertices, {} control points",
        line_set.vertex_count(),
        line_set.control_point_count()
    );
    commands.insert_resource(LineGeometryBuffers::new(&render_device, line_set));
    *ping_pong = PingPong::default();
}
