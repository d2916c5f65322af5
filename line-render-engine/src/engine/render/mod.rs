//! Render world side of the opacity optimisation.
//!
//! Owns the GPU resources for the loaded line set and the current view size,
//! prepares per-frame bind groups and runs every pass from one render graph
//! node inserted after the main transparent pass.

/// Per-frame uniform, fill and pass bind groups plus the smoothing schedule.
pub mod bind_groups;

/// Components and resources shared between the main and render worlds.
pub mod extraction;

/// Fragment list pools and heads sized to the view.
pub mod frame_resources;

/// Static line buffers and the control point opacity pair.
pub mod geometry_buffers;

/// The render graph node issuing every opacity pass in order.
pub mod node;

/// Bind group layouts and pipeline compilation.
pub mod pipelines;

/// Plugin wiring extraction, prepare systems and the graph node.
pub mod plugin;
