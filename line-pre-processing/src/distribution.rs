//! Control point budget distribution across polylines.
//!
//! Every line receives at least two control points so it always has a start and
//! an end value. The rest of the budget follows arc length, with truncation
//! leftovers handed out by the largest remainder method.

use crate::error::GeometryError;

/// Splits `budget` control points across lines of the given lengths.
///
/// The result sums to exactly `budget` and holds at least 2 per line.
pub fn distribute_control_points(lengths: &[f32], budget: u32) -> Result<Vec<u32>, GeometryError> {
    let line_count = lengths.len();
    if line_count == 0 {
        return Err(GeometryError::Empty);
    }
    if (budget as u64) < 2 * line_count as u64 {
        return Err(GeometryError::InsufficientBudget {
            budget,
            lines: line_count,
        });
    }

    let mut counts = vec![2u32; line_count];
    let total_length: f64 = lengths.iter().map(|&length| length.max(0.0) as f64).sum();

    if total_length <= 0.0 {
        spread_evenly(&mut counts, budget);
        return Ok(counts);
    }

    // Lines no longer than the average spacing keep the floor of two.
    let average = total_length / budget as f64;
    let mut fixed: Vec<bool> = lengths
        .iter()
        .map(|&length| length as f64 <= average)
        .collect();

    // A long line can still end up with a share below two once the short lines
    // took their reserve. Clamp those too and repeat until the split is stable.
    let (remaining_budget, remaining_length) = loop {
        let fixed_count = fixed.iter().filter(|&&is_fixed| is_fixed).count();
        let remaining_budget = budget as f64 - 2.0 * fixed_count as f64;
        let remaining_length: f64 = lengths
            .iter()
            .zip(&fixed)
            .filter(|(_, is_fixed)| !**is_fixed)
            .map(|(&length, _)| length as f64)
            .sum();

        let mut clamped = false;
        for (index, &length) in lengths.iter().enumerate() {
            if !fixed[index] && (length as f64 / remaining_length) * remaining_budget < 2.0 {
                fixed[index] = true;
                clamped = true;
            }
        }
        if !clamped {
            break (remaining_budget, remaining_length);
        }
    };

    let mut remainders = Vec::new();
    for (index, &length) in lengths.iter().enumerate() {
        if fixed[index] {
            continue;
        }
        let share = length as f64 / remaining_length * remaining_budget;
        counts[index] = share.floor() as u32;
        remainders.push((index, share - share.floor()));
    }

    // Largest remainder first, lower line index on ties.
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let assigned: u64 = counts.iter().map(|&count| count as u64).sum();
    let mut leftover = budget as i64 - assigned as i64;

    let mut cursor = 0;
    while leftover > 0 && !remainders.is_empty() {
        counts[remainders[cursor % remainders.len()].0] += 1;
        leftover -= 1;
        cursor += 1;
    }

    // Rounding noise can overshoot by a point, take it back from the smallest remainder.
    let mut cursor = remainders.len();
    while leftover < 0 && cursor > 0 {
        cursor -= 1;
        let index = remainders[cursor].0;
        if counts[index] > 2 {
            counts[index] -= 1;
            leftover += 1;
        }
    }

    Ok(counts)
}

/// Budget split for sets where every line has zero length.
fn spread_evenly(counts: &mut [u32], budget: u32) {
    let line_count = counts.len() as u32;
    let leftover = budget - 2 * line_count;
    let base = leftover / line_count;
    let extra = (leftover % line_count) as usize;
    for (index, count) in counts.iter_mut().enumerate() {
        *count += base + u32::from(index < extra);
    }
}

/// Owning line of every control point, `counts.iter().sum()` entries.
pub fn control_point_line_ids(counts: &[u32]) -> Vec<u32> {
    counts
        .iter()
        .enumerate()
        .flat_map(|(line, &count)| std::iter::repeat_n(line as u32, count as usize))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_budget_below_floor() {
        let err = distribute_control_points(&[1.0, 2.0, 3.0], 5).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InsufficientBudget { budget: 5, lines: 3 }
        ));
    }

    #[test]
    fn budget_equal_to_floor_gives_two_each() {
        let counts = distribute_control_points(&[0.5, 30.0, 2.0], 6).unwrap();
        assert_eq!(counts, vec![2, 2, 2]);
    }

    #[test]
    fn zero_length_set_spreads_leftover() {
        let counts = distribute_control_points(&[0.0, 0.0, 0.0], 11).unwrap();
        assert_eq!(counts, vec![4, 4, 3]);
    }

    #[test]
    fn long_line_below_floor_is_clamped() {
        // Line 1 is longer than the average spacing but its share is under two.
        let counts = distribute_control_points(&[100.0, 12.0, 0.5, 0.5], 12).unwrap();
        assert_eq!(counts.iter().sum::<u32>(), 12);
        assert!(counts.iter().all(|&count| count >= 2));
    }

    #[test]
    fn ids_follow_counts() {
        assert_eq!(control_point_line_ids(&[2, 3]), vec![0, 0, 1, 1, 1]);
    }
}
