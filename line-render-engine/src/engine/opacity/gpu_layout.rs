//! Host side mirrors of the structs declared in `shaders/opacity_types.wgsl`
//! and the per-kernel parameter blocks.
//!
//! Every struct here is `#[repr(C)]` and padded by hand to the WGSL uniform or
//! storage layout, so `bytemuck::cast_slice` produces bytes the shaders can
//! read directly.

use bevy::math::{Mat4, UVec2, Vec3};
use bytemuck::{Pod, Zeroable};
use constants::render_settings::{CAMERA_NEAR, EXPECTED_OVERDRAW_IN_LINKED_LISTS};

use crate::engine::core::settings::OpacitySettings;

/// Node of a low resolution fragment list (16 bytes).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq)]
pub struct LowResFragmentLink {
    /// Linear view depth.
    pub depth: f32,
    pub blend_weight: f32,
    pub importance: f32,
    pub next: u32,
}

/// Node of a full resolution fragment list (16 bytes).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq)]
pub struct FragmentLink {
    /// RGBA8 unorm, alpha carries the vertex opacity.
    pub color: u32,
    pub depth: f32,
    pub coverage: f32,
    pub next: u32,
}

/// Truncated Fourier series of one pixel's importance density over depth.
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq)]
pub struct FourierCoefficients {
    /// a0..a3
    pub a: [f32; 4],
    /// unused, b1..b3
    pub b: [f32; 4],
}

/// Per-view constants shared by every opacity pass.
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug)]
pub struct FrameUniform {
    pub clip_from_world: [[f32; 4]; 4],
    pub view_from_world: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub strip_width: f32,
    pub line_color: [f32; 4],
    pub halo_color: [f32; 4],
    pub q: f32,
    pub r: f32,
    pub lambda: f32,
    pub halo_portion: f32,
    pub full_size: [u32; 2],
    pub low_size: [u32; 2],
    pub low_capacity: u32,
    pub hq_capacity: u32,
    pub control_point_count: u32,
    pub vertex_count: u32,
    pub depth_near: f32,
    pub depth_far: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq)]
pub struct FillParams {
    pub value: u32,
    pub count: u32,
    pub _padding: [u32; 2],
}

#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq)]
pub struct SmoothParams {
    pub weight: f32,
    pub count: u32,
    pub _padding: [u32; 2],
}

#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq)]
pub struct FadeParams {
    pub fade_to_alpha: f32,
    pub vertex_count: u32,
    pub control_point_count: u32,
    pub _padding: u32,
}

/// Full and low resolution sizes of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameExtent {
    pub full: UVec2,
    pub low: UVec2,
}

impl FrameExtent {
    pub fn new(full: UVec2, down_scale: u32) -> Self {
        let full = full.max(UVec2::ONE);
        let low = (full / down_scale.max(1)).max(UVec2::ONE);
        Self { full, low }
    }

    pub fn full_pixels(&self) -> u32 {
        self.full.x * self.full.y
    }

    pub fn low_pixels(&self) -> u32 {
        self.low.x * self.low.y
    }

    /// Overdraw-sized node count before device limits are applied.
    pub fn low_capacity(&self) -> u32 {
        self.low_pixels() * EXPECTED_OVERDRAW_IN_LINKED_LISTS
    }

    pub fn hq_capacity(&self) -> u32 {
        self.full_pixels() * EXPECTED_OVERDRAW_IN_LINKED_LISTS
    }
}

/// Node counts of the two fragment pools, bounded by what the device can
/// allocate and bind as one storage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCapacity {
    pub low: u32,
    pub hq: u32,
}

impl PoolCapacity {
    /// Fits the overdraw-sized pools of `extent` into the device limits.
    /// Fragments beyond a clamped capacity are dropped by the list builds.
    pub fn fit(extent: &FrameExtent, max_binding_size: u64, max_buffer_size: u64) -> Self {
        let max_bytes = max_binding_size.min(max_buffer_size);
        let max_nodes = (max_bytes / size_of::<FragmentLink>() as u64).min(u32::MAX as u64) as u32;
        Self {
            low: extent.low_capacity().min(max_nodes),
            hq: extent.hq_capacity().min(max_nodes),
        }
    }

    pub fn is_clamped(&self, extent: &FrameExtent) -> bool {
        self.low < extent.low_capacity() || self.hq < extent.hq_capacity()
    }
}

/// View depth interval covered by the line set's bounding sphere.
pub fn depth_range(camera_position: Vec3, center: Vec3, radius: f32) -> (f32, f32) {
    let distance = camera_position.distance(center);
    let near = (distance - radius).max(CAMERA_NEAR);
    let far = (distance + radius).max(near + 1e-3);
    (near, far)
}

/// Inputs for one frame's uniform block.
pub struct FrameInputs<'a> {
    pub clip_from_world: Mat4,
    pub view_from_world: Mat4,
    pub camera_position: Vec3,
    pub settings: &'a OpacitySettings,
    pub extent: FrameExtent,
    pub capacity: PoolCapacity,
    pub control_point_count: u32,
    pub vertex_count: u32,
    pub depth_range: (f32, f32),
}

impl FrameUniform {
    pub fn new(inputs: &FrameInputs) -> Self {
        let settings = inputs.settings;
        Self {
            clip_from_world: inputs.clip_from_world.to_cols_array_2d(),
            view_from_world: inputs.view_from_world.to_cols_array_2d(),
            camera_position: inputs.camera_position.to_array(),
            strip_width: settings.strip_width,
            line_color: settings.line_color,
            halo_color: settings.halo_color,
            q: settings.q,
            r: settings.r,
            lambda: settings.lambda,
            halo_portion: settings.halo_portion,
            full_size: inputs.extent.full.to_array(),
            low_size: inputs.extent.low.to_array(),
            low_capacity: inputs.capacity.low,
            hq_capacity: inputs.capacity.hq,
            control_point_count: inputs.control_point_count,
            vertex_count: inputs.vertex_count,
            depth_near: inputs.depth_range.0,
            depth_far: inputs.depth_range.1,
            _padding: [0.0; 2],
        }
    }
}

/// Workgroups for a 1D kernel of `count` invocations.
pub fn workgroups_1d(count: u32, workgroup_size: u32) -> u32 {
    count.div_ceil(workgroup_size).max(1)
}

/// Workgroups for a 2D per-pixel kernel.
pub fn workgroups_2d(size: UVec2, tile: u32) -> UVec2 {
    UVec2::new(size.x.div_ceil(tile), size.y.div_ceil(tile)).max(UVec2::ONE)
}
