/// Procedural vortex streamlines for trying the renderer without a dataset.
use crate::obj::RawLineSet;
use std::f32::consts::TAU;

/// Helical streamlines spiralling around the vertical axis through (10, y, 10).
///
/// Inner lines get high importance, outer lines low, so the optimiser has
/// something to fade.
pub fn tornado(line_count: usize, samples_per_line: usize) -> RawLineSet {
    let mut set = RawLineSet::default();
    let samples = samples_per_line.max(2);

    for line in 0..line_count {
        let seed = (line as f32 + 0.5) / line_count.max(1) as f32;
        let base_radius = 1.0 + 8.0 * seed;
        let phase = seed * 97.0 * TAU;
        let turns = 3.0 - 2.0 * seed;
        let importance = (1.0 - seed).clamp(0.0, 1.0);

        let mut indices = Vec::with_capacity(samples);
        for sample in 0..samples {
            let t = sample as f32 / (samples - 1) as f32;
            let radius = base_radius * (0.3 + 0.7 * t);
            let angle = phase + t * turns * TAU;
            indices.push(set.vertices.len() as u32);
            set.vertices.push([
                10.0 + radius * angle.cos(),
                20.0 * t,
                10.0 + radius * angle.sin(),
            ]);
            set.importance.push(importance);
        }
        set.lines.push(indices);
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vertex_has_importance() {
        let set = tornado(5, 40);
        assert_eq!(set.lines.len(), 5);
        assert_eq!(set.vertices.len(), 200);
        assert_eq!(set.importance.len(), set.vertices.len());
    }
}
