/// Fragment pool capacity factor, pool length = pixels * overdraw.
pub const EXPECTED_OVERDRAW_IN_LINKED_LISTS: u32 = 8;

/// Terminates a per-pixel fragment list and marks an empty head slot.
pub const END_OF_LIST: u32 = 0xffff_ffff;

/// Bit pattern of a control point the solve pass never touched. Read as alpha 1.0.
pub const UNWRITTEN_ALPHA_BITS: u32 = 0xffff_ffff;

/// Fragments considered per pixel when sorting. Anything deeper is ignored.
pub const MAX_FRAGMENTS_PER_PIXEL: u32 = 64;

/// 1D dispatch size for control point, vertex and fill kernels.
pub const WORKGROUP_SIZE: u32 = 256;

/// 2D dispatch tile for the per-pixel solve kernels.
pub const PIXEL_TILE_SIZE: u32 = 8;

/// Consecutive points closer than this (squared) collapse into one.
pub const DEDUP_EPSILON_SQ: f32 = 1e-4;

/// Keeps the last vertex of a line strictly inside its control point range.
pub const BLEND_WEIGHT_EPSILON: f32 = 1e-4;

/// Importance of vertices that have no `vt` record.
pub const DEFAULT_IMPORTANCE: f32 = 0.5;

/// The shrink sub-step runs with `-SHRINK_FACTOR * laplace_weight`.
pub const SHRINK_FACTOR: f32 = 1.01;

/// Fourier terms kept per low resolution pixel (a0..a3, b1..b3).
pub const FOURIER_TERMS: u32 = 4;

pub const DEFAULT_FADE_TO_ALPHA: f32 = 0.1;
pub const DEFAULT_LAPLACE_WEIGHT: f32 = 0.1;
pub const DEFAULT_HALO_PORTION: f32 = 0.7;
pub const DEFAULT_RESOLUTION_DOWN_SCALE: u32 = 1;
pub const DEFAULT_LINE_COLOR: [f32; 4] = [1.0, 163.0 / 255.0, 0.0, 1.0];
pub const DEFAULT_HALO_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const BACKGROUND_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub const MAX_SMOOTHING_ITERATIONS: u32 = 100;
pub const MAX_RESOLUTION_DOWN_SCALE: u32 = 8;

// Camera
pub const CAMERA_FOV: f32 = std::f32::consts::FRAC_PI_4;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 100.0;
pub const WINDOW_RESOLUTION: (f32, f32) = (700.0, 700.0);
pub const WINDOW_TITLE: &str = "Decoupled Opacity Optimization Demo";
