use indicatif::ProgressBar;
use line_pre_processing::prepare::prepare_line_set_with_progress;
use line_pre_processing::writer::{read_prepared, write_prepared};
use line_pre_processing::{RawLineSet, parse_line_set, prepare_line_set, synthetic};

fn straight_line(length: f32, segments: usize) -> Vec<[f32; 3]> {
    (0..=segments)
        .map(|i| [length * i as f32 / segments as f32, 0.0, 0.0])
        .collect()
}

fn raw_from_lines(lines: &[Vec<[f32; 3]>]) -> RawLineSet {
    let mut raw = RawLineSet::default();
    for line in lines {
        let start = raw.vertices.len() as u32;
        raw.vertices.extend_from_slice(line);
        raw.lines
            .push((start..start + line.len() as u32).collect());
    }
    raw
}

#[test]
fn single_line_weights_span_control_point_range() {
    let raw = raw_from_lines(&[straight_line(10.0, 10)]);
    let prepared = prepare_line_set(&raw, 4).unwrap();

    assert_eq!(prepared.control_points_per_line, vec![4]);
    let weights = &prepared.blend_weights;
    assert_eq!(weights[0], 0.0);
    for (i, &weight) in weights.iter().enumerate().take(10) {
        assert!((weight - 0.3 * i as f32).abs() < 1e-4, "vertex {i}: {weight}");
    }
    assert!(weights[10] < 3.0 && weights[10] > 2.999);
}

#[test]
fn two_lines_split_two_and_eight() {
    let raw = raw_from_lines(&[straight_line(1.0, 2), straight_line(100.0, 20)]);
    let prepared = prepare_line_set(&raw, 10).unwrap();
    assert_eq!(prepared.control_points_per_line, vec![2, 8]);
    assert_eq!(prepared.control_point_line_ids, vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1]);
    assert_eq!(prepared.validate(), Ok(()));
}

#[test]
fn weights_are_monotonic_and_inside_line_range() {
    let raw = synthetic::tornado(30, 60);
    let prepared = prepare_line_set(&raw, 900).unwrap();
    prepared.validate().unwrap();

    for pair in prepared
        .line_ids
        .iter()
        .zip(&prepared.blend_weights)
        .collect::<Vec<_>>()
        .windows(2)
    {
        let ((line_a, weight_a), (line_b, weight_b)) = (pair[0], pair[1]);
        if line_a == line_b {
            assert!(weight_a <= weight_b);
        }
    }
}

#[test]
fn every_control_point_is_bracketed_by_a_vertex() {
    let raw = synthetic::tornado(12, 80);
    let prepared = prepare_line_set(&raw, 200).unwrap();

    let mut touched = vec![false; prepared.control_point_count()];
    for &weight in &prepared.blend_weights {
        let base = weight.floor() as usize;
        touched[base] = true;
        touched[base + 1] = true;
    }
    assert!(touched.iter().all(|&hit| hit));
}

#[test]
fn zero_length_line_gets_two_points_without_nan() {
    let raw = raw_from_lines(&[
        vec![[1.0, 1.0, 1.0], [1.0, 1.0, 1.001], [1.0, 1.0, 1.0]],
        straight_line(5.0, 5),
    ]);
    let prepared = prepare_line_set(&raw, 8).unwrap();

    assert_eq!(prepared.control_points_per_line, vec![2, 6]);
    // Near-duplicates collapse into one point.
    assert_eq!(prepared.line_ids.iter().filter(|&&id| id == 0).count(), 1);
    assert!(prepared.blend_weights.iter().all(|weight| weight.is_finite()));
    assert_eq!(prepared.blend_weights[0], 0.0);
    assert_eq!(prepared.validate(), Ok(()));
}

#[test]
fn closed_polyline_with_vertex_count_budget_gets_one_point_per_vertex() {
    let sides = 12;
    let mut ring: Vec<[f32; 3]> = (0..sides)
        .map(|i| {
            let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
            [angle.cos(), angle.sin(), 0.0]
        })
        .collect();
    ring.push(ring[0]);
    let raw = raw_from_lines(&[ring]);
    let vertex_count = raw.vertices.len() as u32;

    let prepared = prepare_line_set(&raw, vertex_count).unwrap();
    assert_eq!(prepared.control_points_per_line, vec![vertex_count]);
    for (i, &weight) in prepared.blend_weights.iter().enumerate().take(sides) {
        assert_eq!(weight.round() as usize, i);
    }
}

#[test]
fn empty_lines_are_dropped() {
    let raw = parse_line_set("v 0 0 0\nv 1 0 0\nl\nl 1 2\n").unwrap();
    let prepared = prepare_line_set(&raw, 4).unwrap();
    assert_eq!(prepared.line_count(), 1);
    assert_eq!(prepared.control_points_per_line, vec![4]);
}

#[test]
fn progress_completes_when_lines_are_dropped() {
    let raw = parse_line_set("v 0 0 0\nv 1 0 0\nv 2 0 0\nl\nl 1 2\nl\nl 2 3\n").unwrap();
    let total = 2 * raw.lines.len() as u64;
    let progress = ProgressBar::hidden();
    progress.set_length(total);

    let prepared = prepare_line_set_with_progress(&raw, 4, &progress).unwrap();

    assert_eq!(prepared.line_count(), 2);
    assert_eq!(progress.position(), total);
}

#[test]
fn prepared_file_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tornado.lines.json");
    let prepared = prepare_line_set(&synthetic::tornado(4, 20), 40).unwrap();

    write_prepared(&prepared, &path).unwrap();
    let back = read_prepared(&path).unwrap();
    assert_eq!(back.control_points_per_line, prepared.control_points_per_line);
    assert_eq!(back.vertex_count(), prepared.vertex_count());
}
