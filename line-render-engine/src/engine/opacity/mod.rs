//! Opacity optimisation data layouts and scheduling.
//!
//! Everything here is independent of a live GPU: struct layouts shared with
//! WGSL, buffer metadata, the per-frame ping-pong plan and CPU versions of the
//! kernels.

/// Typed GPU buffers tagged with element kind and length.
pub mod gpu_array;

/// `Pod` mirrors of the WGSL structs and frame sizing helpers.
pub mod gpu_layout;

/// Double-buffered control point opacity scheduling.
pub mod ping_pong;

/// CPU implementations of the solve, smoothing, fade and composite kernels.
pub mod reference;
