//! Interactive line renderer with decoupled opacity optimisation.
//!
//! Opacities are solved per control point at low resolution, smoothed along
//! each line, faded into per-vertex values and composited at full resolution
//! with per-pixel fragment lists.

pub mod engine;
