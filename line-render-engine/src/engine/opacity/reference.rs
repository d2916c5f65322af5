//! CPU versions of the opacity kernels.
//!
//! Each function follows its WGSL counterpart step for step: same sort
//! order, same clamps, same sentinel handling. They back the unit tests and
//! are handy when checking a frame by hand.

use std::f32::consts::TAU;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use constants::render_settings::{
    END_OF_LIST, FOURIER_TERMS, MAX_FRAGMENTS_PER_PIXEL, UNWRITTEN_ALPHA_BITS,
};

use super::gpu_layout::FourierCoefficients;

/// Per-pixel linked fragment lists with a shared bounded pool.
///
/// Appends take a slot from one atomic counter and swap the pixel head, so
/// lists come back newest first. Appends past capacity are dropped.
pub struct LinkedFragmentPool<T> {
    heads: Vec<AtomicU32>,
    nodes: Vec<OnceLock<(T, u32)>>,
    counter: AtomicU32,
}

impl<T> LinkedFragmentPool<T> {
    pub fn new(pixels: usize, capacity: usize) -> Self {
        Self {
            heads: (0..pixels).map(|_| AtomicU32::new(END_OF_LIST)).collect(),
            nodes: (0..capacity).map(|_| OnceLock::new()).collect(),
            counter: AtomicU32::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns false when the pool is full.
    pub fn append(&self, pixel: usize, fragment: T) -> bool {
        let slot = self.counter.fetch_add(1, Ordering::Relaxed);
        let Some(node) = self.nodes.get(slot as usize) else {
            return false;
        };
        let previous = self.heads[pixel].swap(slot, Ordering::AcqRel);
        node.set((fragment, previous)).is_ok()
    }

    /// Fragments of one pixel, newest first, at most `MAX_FRAGMENTS_PER_PIXEL`.
    pub fn list(&self, pixel: usize) -> Vec<&T> {
        let mut fragments = Vec::new();
        let mut node = self.heads[pixel].load(Ordering::Acquire);
        while node != END_OF_LIST && fragments.len() < MAX_FRAGMENTS_PER_PIXEL as usize {
            let Some((fragment, next)) = self.nodes[node as usize].get() else {
                break;
            };
            fragments.push(fragment);
            node = *next;
        }
        fragments
    }

    pub fn stored(&self) -> usize {
        (self.counter.load(Ordering::Acquire) as usize).min(self.capacity())
    }

    pub fn dropped(&self) -> usize {
        (self.counter.load(Ordering::Acquire) as usize).saturating_sub(self.capacity())
    }

    pub fn reset(&mut self) {
        for head in &mut self.heads {
            *head.get_mut() = END_OF_LIST;
        }
        for node in &mut self.nodes {
            node.take();
        }
        *self.counter.get_mut() = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowResFragment {
    pub depth: f32,
    pub blend_weight: f32,
    pub importance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveWeights {
    pub q: f32,
    pub r: f32,
    pub lambda: f32,
}

/// Closed-form opacity of one fragment given the squared importance in
/// front of and behind it.
pub fn optimal_alpha(importance: f32, front: f32, back: f32, weights: &SolveWeights) -> f32 {
    let base = (1.0 - importance).max(0.0);
    let falloff = if base > 0.0 {
        base.powf(2.0 * weights.lambda)
    } else {
        0.0
    };
    1.0 / (1.0 + falloff * (weights.q * front + weights.r * back))
}

fn sort_front_to_back(list: &[LowResFragment]) -> Vec<LowResFragment> {
    let mut sorted: Vec<LowResFragment> = Vec::with_capacity(list.len());
    for fragment in list.iter().take(MAX_FRAGMENTS_PER_PIXEL as usize) {
        let mut slot = sorted.len();
        while slot > 0 && sorted[slot - 1].depth > fragment.depth {
            slot -= 1;
        }
        sorted.insert(slot, *fragment);
    }
    sorted
}

/// Solves one pixel's list (newest first). Returns fragments front to back
/// with their opacity.
pub fn solve_pixel(list: &[LowResFragment], weights: &SolveWeights) -> Vec<(LowResFragment, f32)> {
    let sorted = sort_front_to_back(list);
    let total: f32 = sorted
        .iter()
        .map(|fragment| fragment.importance.clamp(0.0, 1.0).powi(2))
        .sum();

    let mut front = 0.0;
    sorted
        .into_iter()
        .map(|fragment| {
            let importance = fragment.importance.clamp(0.0, 1.0);
            let squared = importance * importance;
            let back = (total - front - squared).max(0.0);
            let alpha = optimal_alpha(importance, front, back, weights);
            front += squared;
            (fragment, alpha)
        })
        .collect()
}

/// Min-gathers an opacity into the two control points around a blend weight.
pub fn scatter_min(alpha_bits: &mut [u32], blend_weight: f32, alpha: f32) {
    let base = blend_weight.floor().max(0.0) as usize;
    let bits = alpha.to_bits();
    for slot in [base, base + 1] {
        if let Some(current) = alpha_bits.get_mut(slot) {
            *current = (*current).min(bits);
        }
    }
}

pub fn normalized_depth(depth: f32, depth_range: (f32, f32)) -> f32 {
    let (near, far) = depth_range;
    ((depth - near) / (far - near).max(1e-6)).clamp(0.0, 1.0)
}

/// Fourier coefficients of the squared importance density over normalised depth.
pub fn fourier_coefficients(
    list: &[LowResFragment],
    depth_range: (f32, f32),
) -> FourierCoefficients {
    let mut coefficients = FourierCoefficients::default();
    for fragment in list.iter().take(MAX_FRAGMENTS_PER_PIXEL as usize) {
        let weight = fragment.importance.clamp(0.0, 1.0).powi(2);
        let phase = TAU * normalized_depth(fragment.depth, depth_range);
        coefficients.a[0] += 2.0 * weight;
        for k in 1..FOURIER_TERMS as usize {
            let angle = phase * k as f32;
            coefficients.a[k] += 2.0 * weight * angle.cos();
            coefficients.b[k] += 2.0 * weight * angle.sin();
        }
    }
    coefficients
}

/// Integral of the reconstructed density from 0 to `depth`.
pub fn fourier_occlusion(coefficients: &FourierCoefficients, depth: f32) -> f32 {
    let mut value = 0.5 * coefficients.a[0] * depth;
    for k in 1..FOURIER_TERMS as usize {
        let frequency = TAU * k as f32;
        value += coefficients.a[k] / frequency * (frequency * depth).sin()
            + coefficients.b[k] / frequency * (1.0 - (frequency * depth).cos());
    }
    value
}

/// Fourier variant of [`solve_pixel`]; returns opacities in list order.
pub fn solve_pixel_fourier(
    list: &[LowResFragment],
    weights: &SolveWeights,
    depth_range: (f32, f32),
) -> Vec<f32> {
    let coefficients = fourier_coefficients(list, depth_range);
    let total = 0.5 * coefficients.a[0];

    list.iter()
        .take(MAX_FRAGMENTS_PER_PIXEL as usize)
        .map(|fragment| {
            let importance = fragment.importance.clamp(0.0, 1.0);
            let squared = importance * importance;
            let depth = normalized_depth(fragment.depth, depth_range);
            let front = (fourier_occlusion(&coefficients, depth) - 0.5 * squared)
                .clamp(0.0, (total - squared).max(0.0));
            let back = (total - front - squared).max(0.0);
            optimal_alpha(importance, front, back, weights)
        })
        .collect()
}

/// Control points nothing gathered into read as fully opaque.
pub fn alpha_from_bits(bits: u32) -> f32 {
    if bits == UNWRITTEN_ALPHA_BITS {
        1.0
    } else {
        f32::from_bits(bits)
    }
}

/// One Laplacian step over control points, restricted to neighbours on the same line.
pub fn smooth_step(read: &[u32], write: &mut [u32], line_ids: &[u32], weight: f32) {
    let count = read.len();
    for i in 0..count {
        let center = alpha_from_bits(read[i]);
        let mut sum = 0.0;
        let mut neighbours = 0.0;
        if i > 0 && line_ids[i - 1] == line_ids[i] {
            sum += alpha_from_bits(read[i - 1]);
            neighbours += 1.0;
        }
        if i + 1 < count && line_ids[i + 1] == line_ids[i] {
            sum += alpha_from_bits(read[i + 1]);
            neighbours += 1.0;
        }
        let mut result = center;
        if neighbours > 0.0 {
            result = center + weight * (sum / neighbours - center);
        }
        write[i] = result.clamp(0.0, 1.0).to_bits();
    }
}

/// WGSL `mix`.
pub fn mix(from: f32, to: f32, t: f32) -> f32 {
    from * (1.0 - t) + to * t
}

/// Blends every vertex's opacity toward its interpolated control point value.
pub fn fade_to_vertex(alpha_bits: &[u32], blend_weights: &[f32], current: &mut [f32], fade: f32) {
    let last = alpha_bits.len().saturating_sub(1);
    for (vertex, &weight) in blend_weights.iter().enumerate() {
        let base = (weight.floor().max(0.0) as usize).min(last);
        let upper = (base + 1).min(last);
        let t = weight - weight.floor();
        let target = mix(alpha_from_bits(alpha_bits[base]), alpha_from_bits(alpha_bits[upper]), t);
        current[vertex] = mix(current[vertex], target, fade);
    }
}

/// Ribbon colour and opacity at signed strip coordinate `side` in [-1, 1].
pub fn shade_ribbon(
    side: f32,
    alpha: f32,
    halo_portion: f32,
    line_color: [f32; 4],
    halo_color: [f32; 4],
) -> [f32; 4] {
    let color = if side.abs() < halo_portion {
        line_color
    } else {
        halo_color
    };
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0) * color[3]]
}

/// Anti-aliased coverage from the distance to the strip edge and its screen derivative.
pub fn edge_coverage(side: f32, side_width: f32) -> f32 {
    ((1.0 - side.abs()) / side_width.max(1e-5)).clamp(0.0, 1.0)
}

/// WGSL `pack4x8unorm`.
pub fn pack_color(color: [f32; 4]) -> u32 {
    color
        .iter()
        .enumerate()
        .map(|(i, channel)| ((channel.clamp(0.0, 1.0) * 255.0).round() as u32) << (8 * i))
        .fold(0, |packed, byte| packed | byte)
}

/// WGSL `unpack4x8unorm`.
pub fn unpack_color(packed: u32) -> [f32; 4] {
    std::array::from_fn(|i| ((packed >> (8 * i)) & 0xff) as f32 / 255.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedFragment {
    /// Straight (not premultiplied) colour; alpha includes coverage.
    pub color: [f32; 4],
    pub depth: f32,
}

/// Stable insertion sort, farthest first. Equal depths keep list order.
pub fn sort_back_to_front(list: &[ShadedFragment]) -> Vec<ShadedFragment> {
    let mut sorted: Vec<ShadedFragment> = Vec::with_capacity(list.len());
    for fragment in list.iter().take(MAX_FRAGMENTS_PER_PIXEL as usize) {
        let mut slot = sorted.len();
        while slot > 0 && sorted[slot - 1].depth < fragment.depth {
            slot -= 1;
        }
        sorted.insert(slot, *fragment);
    }
    sorted
}

/// Premultiplied result of compositing one pixel's list, or None when empty.
pub fn composite_pixel(list: &[ShadedFragment]) -> Option<[f32; 4]> {
    if list.is_empty() {
        return None;
    }
    let mut result = [0.0f32; 4];
    for fragment in sort_back_to_front(list) {
        let [r, g, b, a] = fragment.color;
        result = [
            r * a + result[0] * (1.0 - a),
            g * a + result[1] * (1.0 - a),
            b * a + result[2] * (1.0 - a),
            a + result[3] * (1.0 - a),
        ];
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_matches_unorm_layout() {
        let packed = pack_color([1.0, 0.0, 0.5, 1.0]);
        assert_eq!(packed & 0xff, 255);
        assert_eq!(packed >> 24, 255);
        let back = unpack_color(packed);
        assert!((back[2] - 0.5).abs() < 1.0 / 255.0);
    }

    #[test]
    fn sentinel_reads_as_opaque() {
        assert_eq!(alpha_from_bits(UNWRITTEN_ALPHA_BITS), 1.0);
        assert_eq!(alpha_from_bits(0.25f32.to_bits()), 0.25);
    }
}
