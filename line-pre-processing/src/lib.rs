//! Offline preparation of polyline sets for decoupled opacity optimisation.
//!
//! Reads `v` / `vt` / `l` polyline text, removes duplicate points, distributes a
//! fixed control point budget over the lines by arc length and computes the
//! per-vertex blend weights the renderer interpolates alpha with.

pub mod converter;
pub mod distribution;
pub mod error;
pub mod obj;
pub mod prepare;
pub mod synthetic;
pub mod writer;

pub use distribution::{control_point_line_ids, distribute_control_points};
pub use error::GeometryError;
pub use obj::{RawLineSet, parse_line_set, read_line_set};
pub use prepare::{compute_blend_weights, prepare_line_set};
