use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Static per-vertex and per-control-point data of a prepared polyline set.
///
/// Written by the pre-processing tool as `*.lines.json` and loaded by the renderer
/// as an asset. Vertices of one line are contiguous and lines appear in id order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Asset, TypePath)]
pub struct PreparedLineSet {
    pub positions: Vec<[f32; 3]>,
    /// Owning line of every vertex.
    pub line_ids: Vec<u32>,
    pub importance: Vec<f32>,
    /// Fractional global control point index of every vertex.
    pub blend_weights: Vec<f32>,
    pub control_points_per_line: Vec<u32>,
    /// Owning line of every control point, length equals the budget.
    pub control_point_line_ids: Vec<u32>,
    #[serde(default)]
    pub line_lengths: Vec<f32>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

#[derive(Error, Debug, PartialEq)]
pub enum LineSetError {
    #[error("line set has no vertices")]
    Empty,
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line} owns {count} control points, at least 2 are required")]
    TooFewControlPoints { line: usize, count: u32 },
    #[error("vertex {vertex} references unknown line {line}")]
    UnknownLine { vertex: usize, line: u32 },
    #[error("vertex {vertex} blend weight {weight} lies outside [{min}, {max})")]
    BlendWeightOutOfRange {
        vertex: usize,
        weight: f32,
        min: f32,
        max: f32,
    },
}

impl PreparedLineSet {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn line_count(&self) -> usize {
        self.control_points_per_line.len()
    }

    pub fn control_point_count(&self) -> usize {
        self.control_point_line_ids.len()
    }

    /// First global control point index of every line.
    pub fn control_point_offsets(&self) -> Vec<u32> {
        self.control_points_per_line
            .iter()
            .scan(0u32, |offset, &count| {
                let start = *offset;
                *offset += count;
                Some(start)
            })
            .collect()
    }

    /// Sphere enclosing the bounds, used to normalise view depth.
    pub fn bounding_sphere(&self) -> ([f32; 3], f32) {
        let mut center = [0.0; 3];
        let mut radius_sq = 0.0;
        for axis in 0..3 {
            center[axis] = (self.bounds_min[axis] + self.bounds_max[axis]) * 0.5;
            let half = (self.bounds_max[axis] - self.bounds_min[axis]) * 0.5;
            radius_sq += half * half;
        }
        (center, f32::sqrt(radius_sq))
    }

    /// Checks the cross-array invariants the GPU passes index by.
    pub fn validate(&self) -> Result<(), LineSetError> {
        let vertices = self.vertex_count();
        if vertices == 0 {
            return Err(LineSetError::Empty);
        }

        for (field, found) in [
            ("line_ids", self.line_ids.len()),
            ("importance", self.importance.len()),
            ("blend_weights", self.blend_weights.len()),
        ] {
            if found != vertices {
                return Err(LineSetError::LengthMismatch {
                    field,
                    expected: vertices,
                    found,
                });
            }
        }

        let budget: usize = self
            .control_points_per_line
            .iter()
            .map(|&count| count as usize)
            .sum();
        if budget != self.control_point_count() {
            return Err(LineSetError::LengthMismatch {
                field: "control_point_line_ids",
                expected: budget,
                found: self.control_point_count(),
            });
        }

        if let Some((line, &count)) = self
            .control_points_per_line
            .iter()
            .enumerate()
            .find(|(_, count)| **count < 2)
        {
            return Err(LineSetError::TooFewControlPoints { line, count });
        }

        let offsets = self.control_point_offsets();
        let vertices = self.line_ids.iter().zip(&self.blend_weights);
        for (vertex, (&line, &weight)) in vertices.enumerate() {
            let Some(&offset) = offsets.get(line as usize) else {
                return Err(LineSetError::UnknownLine { vertex, line });
            };
            let min = offset as f32;
            let max = (offset + self.control_points_per_line[line as usize] - 1) as f32;
            if !(weight >= min && weight < max) {
                return Err(LineSetError::BlendWeightOutOfRange {
                    vertex,
                    weight,
                    min,
                    max,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_segment_line() -> PreparedLineSet {
        PreparedLineSet {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            line_ids: vec![0, 0, 0],
            importance: vec![0.5; 3],
            blend_weights: vec![0.0, 0.5, 0.9999],
            control_points_per_line: vec![2],
            control_point_line_ids: vec![0, 0],
            line_lengths: vec![2.0],
            bounds_min: [0.0, 0.0, 0.0],
            bounds_max: [2.0, 0.0, 0.0],
        }
    }

    #[test]
    fn valid_set_passes() {
        assert_eq!(two_segment_line().validate(), Ok(()));
    }

    #[test]
    fn detects_short_importance() {
        let mut set = two_segment_line();
        set.importance.pop();
        assert_eq!(
            set.validate(),
            Err(LineSetError::LengthMismatch {
                field: "importance",
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn detects_weight_past_last_control_point() {
        let mut set = two_segment_line();
        set.blend_weights[2] = 1.0;
        assert!(matches!(
            set.validate(),
            Err(LineSetError::BlendWeightOutOfRange { vertex: 2, .. })
        ));
    }

    #[test]
    fn offsets_are_prefix_sums() {
        let set = PreparedLineSet {
            control_points_per_line: vec![2, 5, 3],
            ..Default::default()
        };
        assert_eq!(set.control_point_offsets(), vec![0, 2, 7]);
    }

    #[test]
    fn json_round_trip_keeps_arrays() {
        let set = two_segment_line();
        let text = serde_json::to_string(&set).unwrap();
        let back: PreparedLineSet = serde_json::from_str(&text).unwrap();
        assert_eq!(back, set);
    }
}
