use bevy::{
    prelude::*,
    render::{
        render_resource::{
            BufferUsages, Extent3d, TextureDescriptor, TextureDimension, TextureUsages,
            TextureView, TextureViewDescriptor,
        },
        renderer::RenderDevice,
        view::ExtractedView,
    },
};

use crate::engine::core::settings::OpacitySettings;
use crate::engine::opacity::gpu_array::{ElementKind, GpuArray};
use crate::engine::opacity::gpu_layout::{FrameExtent, PoolCapacity};
use crate::engine::render::extraction::OpacityCamera;
use crate::engine::render::pipelines::LOW_RES_TARGET_FORMAT;

/// Fragment list storage sized to the view.
///
/// Recreated when the view size or the resolution down scale changes.
#[derive(Resource)]
pub struct OpacityFrameResources {
    pub extent: FrameExtent,
    pub capacity: PoolCapacity,
    pub low_heads: GpuArray,
    pub low_nodes: GpuArray,
    pub low_counter: GpuArray,
    pub hq_heads: GpuArray,
    pub hq_nodes: GpuArray,
    pub hq_counter: GpuArray,
    pub fourier: GpuArray,
    /// Colour attachment of the low resolution list build, never written.
    pub low_res_target: TextureView,
}

impl OpacityFrameResources {
    pub fn new(render_device: &RenderDevice, extent: FrameExtent) -> Self {
        let limits = render_device.limits();
        let capacity = PoolCapacity::fit(
            &extent,
            limits.max_storage_buffer_binding_size as u64,
            limits.max_buffer_size,
        );
        if capacity.is_clamped(&extent) {
            warn!(
                "Fragment pools clamped to device limits: {} low, {} full resolution nodes \
                 (wanted {} and {}), dense views will drop fragments",
                capacity.low,
                capacity.hq,
                extent.low_capacity(),
                extent.hq_capacity()
            );
        }

        let usage = BufferUsages::STORAGE | BufferUsages::COPY_DST;
        let array = |label: &str, kind: ElementKind, len: u32| {
            GpuArray::zeroed(render_device, label, kind, len, usage)
        };

        let low_res_texture = render_device.create_texture(&TextureDescriptor {
            label: Some("opacity_low_res_target"),
            size: Extent3d {
                width: extent.low.x,
                height: extent.low.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: LOW_RES_TARGET_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            low_heads: array("opacity_low_res_heads", ElementKind::U32, extent.low_pixels()),
            low_nodes: array(
                "opacity_low_res_nodes",
                ElementKind::LowResLink,
                capacity.low,
            ),
            low_counter: array("opacity_low_res_counter", ElementKind::U32, 1),
            hq_heads: array("opacity_hq_heads", ElementKind::U32, extent.full_pixels()),
            hq_nodes: array(
                "opacity_hq_nodes",
                ElementKind::FragmentLink,
                capacity.hq,
            ),
            hq_counter: array("opacity_hq_counter", ElementKind::U32, 1),
            fourier: array(
                "opacity_fourier_coefficients",
                ElementKind::FourierCoefficients,
                extent.low_pixels(),
            ),
            low_res_target: low_res_texture.create_view(&TextureViewDescriptor::default()),
            extent,
            capacity,
        }
    }
}

pub fn prepare_frame_resources(
    mut commands: Commands,
    views: Query<&ExtractedView, With<OpacityCamera>>,
    settings: Option<Res<OpacitySettings>>,
    existing: Option<Res<OpacityFrameResources>>,
    render_device: Res<RenderDevice>,
) {
    let (Ok(view), Some(settings)) = (views.single(), settings) else {
        return;
    };

    let extent = FrameExtent::new(view.viewport.zw(), settings.resolution_down_scale);
    if existing.is_some_and(|existing| existing.extent == extent) {
        return;
    }

    info!(
        "Allocating fragment lists: {}x{} full, {}x{} low resolution",
        extent.full.x, extent.full.y, extent.low.x, extent.low.y
    );
    commands.insert_resource(OpacityFrameResources::new(&render_device, extent));
}
