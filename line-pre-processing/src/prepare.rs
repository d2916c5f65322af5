/// Turns raw polylines into the GPU-ready prepared line set.
use crate::distribution::{control_point_line_ids, distribute_control_points};
use crate::error::GeometryError;
use crate::obj::RawLineSet;
use constants::line_set::PreparedLineSet;
use constants::render_settings::{BLEND_WEIGHT_EPSILON, DEDUP_EPSILON_SQ};
use indicatif::ProgressBar;
use rayon::prelude::*;

/// One polyline after duplicate removal.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanLine {
    pub positions: Vec<[f32; 3]>,
    pub importance: Vec<f32>,
    pub length: f32,
}

/// Drops consecutive points within `DEDUP_EPSILON_SQ` of the last kept point.
/// The first point of a line is always kept.
pub fn dedupe_line(raw: &RawLineSet, indices: &[u32]) -> (Vec<[f32; 3]>, Vec<f32>) {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(indices.len());
    let mut importance = Vec::with_capacity(indices.len());

    for &index in indices {
        let point = raw.vertices[index as usize];
        if let Some(last) = positions.last() {
            if distance_sq(*last, point) <= DEDUP_EPSILON_SQ {
                continue;
            }
        }
        positions.push(point);
        importance.push(raw.importance_of(index));
    }

    (positions, importance)
}

pub fn line_length(points: &[[f32; 3]]) -> f32 {
    points
        .windows(2)
        .map(|pair| distance_sq(pair[0], pair[1]).sqrt())
        .sum()
}

/// Fractional global control point index of every vertex of one line.
///
/// Values are non-decreasing and stay inside `[cp_offset, cp_offset + num_cp - 1)`.
/// A zero-length line maps every vertex onto `cp_offset`.
pub fn compute_blend_weights(
    points: &[[f32; 3]],
    length: f32,
    num_cp: u32,
    cp_offset: u32,
) -> Vec<f32> {
    if length <= 0.0 {
        return vec![cp_offset as f32; points.len()];
    }

    let span = (num_cp - 1) as f64;
    let offset = cp_offset as f64;
    // Large offsets lose the epsilon to f32 rounding, so clamp to the last
    // representable value below the range end as well.
    let upper = below((cp_offset + num_cp - 1) as f32);

    let mut traveled = 0.0f64;
    let mut weights = Vec::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        if index > 0 {
            traveled += distance_sq(points[index - 1], *point).sqrt() as f64;
        }
        let local = (traveled / length as f64 * span).min(span - BLEND_WEIGHT_EPSILON as f64);
        weights.push(((local + offset) as f32).min(upper));
    }
    weights
}

/// Largest f32 strictly below a positive `value`.
fn below(value: f32) -> f32 {
    f32::from_bits(value.to_bits() - 1)
}

/// Full preparation without progress output.
pub fn prepare_line_set(raw: &RawLineSet, budget: u32) -> Result<PreparedLineSet, GeometryError> {
    prepare_line_set_with_progress(raw, budget, &ProgressBar::hidden())
}

/// Full preparation, ticking `progress` once per input line for each parallel stage.
pub fn prepare_line_set_with_progress(
    raw: &RawLineSet,
    budget: u32,
    progress: &ProgressBar,
) -> Result<PreparedLineSet, GeometryError> {
    let lines: Vec<CleanLine> = raw
        .lines
        .par_iter()
        .map(|indices| {
            let (positions, importance) = dedupe_line(raw, indices);
            let length = line_length(&positions);
            progress.inc(1);
            CleanLine {
                positions,
                importance,
                length,
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        // A line without vertices could never reference its control points.
        .filter(|line| !line.positions.is_empty())
        .collect();
    // Dropped lines skip the weight stage
    progress.inc((raw.lines.len() - lines.len()) as u64);

    if lines.is_empty() {
        return Err(GeometryError::Empty);
    }

    let lengths: Vec<f32> = lines.iter().map(|line| line.length).collect();
    let counts = distribute_control_points(&lengths, budget)?;

    let offsets: Vec<u32> = counts
        .iter()
        .scan(0u32, |offset, &count| {
            let start = *offset;
            *offset += count;
            Some(start)
        })
        .collect();

    let weights: Vec<Vec<f32>> = lines
        .par_iter()
        .zip(counts.par_iter().zip(offsets.par_iter()))
        .map(|(line, (&num_cp, &cp_offset))| {
            let weights = compute_blend_weights(&line.positions, line.length, num_cp, cp_offset);
            progress.inc(1);
            weights
        })
        .collect();

    let mut prepared = PreparedLineSet {
        control_point_line_ids: control_point_line_ids(&counts),
        control_points_per_line: counts,
        line_lengths: lengths,
        bounds_min: [f32::INFINITY; 3],
        bounds_max: [f32::NEG_INFINITY; 3],
        ..Default::default()
    };

    for (line_id, (line, weights)) in lines.into_iter().zip(weights).enumerate() {
        for position in &line.positions {
            for axis in 0..3 {
                prepared.bounds_min[axis] = prepared.bounds_min[axis].min(position[axis]);
                prepared.bounds_max[axis] = prepared.bounds_max[axis].max(position[axis]);
            }
        }
        prepared
            .line_ids
            .extend(std::iter::repeat_n(line_id as u32, line.positions.len()));
        prepared.positions.extend(line.positions);
        prepared.importance.extend(line.importance);
        prepared.blend_weights.extend(weights);
    }

    Ok(prepared)
}

fn distance_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_point_of_every_line() {
        let raw = RawLineSet {
            vertices: vec![[0.0, 0.0, 0.0], [0.001, 0.0, 0.0], [1.0, 0.0, 0.0]],
            lines: vec![vec![0, 1, 2], vec![2, 0]],
            ..Default::default()
        };
        let (first, _) = dedupe_line(&raw, &raw.lines[0]);
        assert_eq!(first, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);

        // Starts where the previous line ended and must not lose its head.
        let (second, _) = dedupe_line(&raw, &raw.lines[1]);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn length_sums_segments() {
        let points = [[0.0, 0.0, 0.0], [3.0, 4.0, 0.0], [3.0, 4.0, 2.0]];
        assert!((line_length(&points) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn last_weight_stays_below_range_end() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let weights = compute_blend_weights(&points, 1.0, 3, 5);
        assert_eq!(weights[0], 5.0);
        assert!(weights[1] < 7.0);
        assert!(weights[1] > 6.99);
    }
}
