use std::mem::size_of;

use bevy::math::{Mat4, UVec2, Vec3};
use constants::render_settings::{
    EXPECTED_OVERDRAW_IN_LINKED_LISTS, PIXEL_TILE_SIZE, WORKGROUP_SIZE,
};
use line_render_engine::engine::core::settings::OpacitySettings;
use line_render_engine::engine::opacity::gpu_array::ElementKind;
use line_render_engine::engine::opacity::gpu_layout::{
    FadeParams, FillParams, FourierCoefficients, FragmentLink, FrameExtent, FrameInputs,
    FrameUniform, LowResFragmentLink, PoolCapacity, SmoothParams, depth_range, workgroups_1d,
    workgroups_2d,
};

/// WebGPU default `max_storage_buffer_binding_size`.
const WEBGPU_MAX_BINDING: u64 = 128 << 20;
/// WebGPU default `max_buffer_size`.
const WEBGPU_MAX_BUFFER: u64 = 256 << 20;

#[test]
fn list_nodes_match_their_wgsl_size() {
    assert_eq!(size_of::<LowResFragmentLink>(), 16);
    assert_eq!(size_of::<FragmentLink>(), 16);
    assert_eq!(size_of::<FourierCoefficients>(), 32);

    assert_eq!(ElementKind::LowResLink.size(), size_of::<LowResFragmentLink>() as u64);
    assert_eq!(ElementKind::FragmentLink.size(), size_of::<FragmentLink>() as u64);
    assert_eq!(
        ElementKind::FourierCoefficients.size(),
        size_of::<FourierCoefficients>() as u64
    );
}

#[test]
fn uniform_blocks_are_sixteen_byte_aligned() {
    assert_eq!(size_of::<FrameUniform>(), 240);
    assert_eq!(size_of::<FrameUniform>() % 16, 0);
    assert_eq!(size_of::<FillParams>(), 16);
    assert_eq!(size_of::<SmoothParams>(), 16);
    assert_eq!(size_of::<FadeParams>(), 16);
}

#[test]
fn extent_scales_down_and_never_collapses() {
    let extent = FrameExtent::new(UVec2::new(700, 701), 2);
    assert_eq!(extent.low, UVec2::new(350, 350));
    assert_eq!(extent.low_capacity(), 350 * 350 * EXPECTED_OVERDRAW_IN_LINKED_LISTS);
    assert_eq!(extent.hq_capacity(), 700 * 701 * EXPECTED_OVERDRAW_IN_LINKED_LISTS);

    let tiny = FrameExtent::new(UVec2::new(3, 0), 8);
    assert_eq!(tiny.full, UVec2::new(3, 1));
    assert_eq!(tiny.low, UVec2::ONE);

    let unscaled = FrameExtent::new(UVec2::new(64, 32), 0);
    assert_eq!(unscaled.low, unscaled.full);
}

#[test]
fn dispatch_sizes_cover_every_item() {
    assert_eq!(workgroups_1d(0, WORKGROUP_SIZE), 1);
    assert_eq!(workgroups_1d(256, WORKGROUP_SIZE), 1);
    assert_eq!(workgroups_1d(257, WORKGROUP_SIZE), 2);
    assert_eq!(
        workgroups_2d(UVec2::new(700, 9), PIXEL_TILE_SIZE),
        UVec2::new(88, 2)
    );
}

#[test]
fn depth_range_brackets_the_bounding_sphere() {
    let (near, far) = depth_range(Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO, 5.0);
    assert_eq!((near, far), (15.0, 25.0));

    // Camera inside the sphere
    let (near, far) = depth_range(Vec3::ZERO, Vec3::ZERO, 5.0);
    assert!(near > 0.0);
    assert!(far > near);
}

#[test]
fn frame_uniform_copies_settings_and_extent() {
    let settings = OpacitySettings::default();
    let extent = FrameExtent::new(UVec2::new(640, 480), 2);
    let uniform = FrameUniform::new(&FrameInputs {
        clip_from_world: Mat4::IDENTITY,
        view_from_world: Mat4::IDENTITY,
        camera_position: Vec3::new(1.0, 2.0, 3.0),
        settings: &settings,
        extent,
        capacity: PoolCapacity::fit(&extent, WEBGPU_MAX_BINDING, WEBGPU_MAX_BUFFER),
        control_point_count: 10,
        vertex_count: 40,
        depth_range: (1.0, 9.0),
    });

    assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0]);
    assert_eq!(uniform.q, settings.q);
    assert_eq!(uniform.r, settings.r);
    assert_eq!(uniform.low_size, [320, 240]);
    assert_eq!(uniform.low_capacity, extent.low_capacity());
    assert_eq!(uniform.hq_capacity, extent.hq_capacity());
    assert_eq!(uniform.control_point_count, 10);
    assert_eq!((uniform.depth_near, uniform.depth_far), (1.0, 9.0));
    assert_eq!(bytemuck::bytes_of(&uniform).len(), 240);
}

#[test]
fn alpha_bits_share_the_f32_layout() {
    assert!(ElementKind::AlphaBits.reads_as_f32());
    assert!(ElementKind::F32.reads_as_f32());
    assert_eq!(ElementKind::AlphaBits.size(), ElementKind::F32.size());
    assert!(!ElementKind::U32.reads_as_f32());
    assert!(!ElementKind::FragmentLink.reads_as_f32());
}

#[test]
fn small_views_keep_the_overdraw_capacity() {
    let extent = FrameExtent::new(UVec2::new(700, 700), 1);
    let capacity = PoolCapacity::fit(&extent, WEBGPU_MAX_BINDING, WEBGPU_MAX_BUFFER);

    assert_eq!(capacity.low, extent.low_capacity());
    assert_eq!(capacity.hq, extent.hq_capacity());
    assert!(!capacity.is_clamped(&extent));
}

#[test]
fn large_views_clamp_pools_to_the_binding_limit() {
    let max_nodes = (WEBGPU_MAX_BINDING / size_of::<FragmentLink>() as u64) as u32;

    // 1920x1080 at 8 fragments per pixel wants 265 MB
    let full_hd = FrameExtent::new(UVec2::new(1920, 1080), 2);
    let capacity = PoolCapacity::fit(&full_hd, WEBGPU_MAX_BINDING, WEBGPU_MAX_BUFFER);
    assert!(capacity.is_clamped(&full_hd));
    assert_eq!(capacity.hq, max_nodes);
    assert_eq!(capacity.low, full_hd.low_capacity());
    assert!(capacity.hq as u64 * size_of::<FragmentLink>() as u64 <= WEBGPU_MAX_BINDING);

    // 4K clamps both pools
    let uhd = FrameExtent::new(UVec2::new(3840, 2160), 1);
    let capacity = PoolCapacity::fit(&uhd, WEBGPU_MAX_BINDING, WEBGPU_MAX_BUFFER);
    assert_eq!((capacity.low, capacity.hq), (max_nodes, max_nodes));
}

#[test]
fn the_smaller_device_limit_wins() {
    let extent = FrameExtent::new(UVec2::new(1920, 1080), 1);
    let capacity = PoolCapacity::fit(&extent, u32::MAX as u64, 64 << 20);
    assert_eq!(capacity.hq, ((64 << 20) / 16) as u32);
}

#[test]
fn uniform_carries_the_clamped_capacity() {
    let settings = OpacitySettings::default();
    let extent = FrameExtent::new(UVec2::new(3840, 2160), 1);
    let capacity = PoolCapacity::fit(&extent, WEBGPU_MAX_BINDING, WEBGPU_MAX_BUFFER);
    let uniform = FrameUniform::new(&FrameInputs {
        clip_from_world: Mat4::IDENTITY,
        view_from_world: Mat4::IDENTITY,
        camera_position: Vec3::ZERO,
        settings: &settings,
        extent,
        capacity,
        control_point_count: 4,
        vertex_count: 8,
        depth_range: (1.0, 2.0),
    });

    assert_eq!(uniform.low_capacity, capacity.low);
    assert_eq!(uniform.hq_capacity, capacity.hq);
    assert!(uniform.hq_capacity < extent.hq_capacity());
}
