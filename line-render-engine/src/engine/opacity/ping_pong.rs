//! Per-frame schedule of the control point opacity buffers.
//!
//! Two buffers hold control point opacities. The solve gathers into the
//! active one, each smoothing sub-step reads one and writes the other, and
//! the fade reads whichever was written last. The active index survives to
//! the next frame.

use bevy::prelude::*;
use constants::render_settings::SHRINK_FACTOR;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingPong {
    active: usize,
}

impl PingPong {
    pub fn active(self) -> usize {
        self.active
    }

    pub fn inactive(self) -> usize {
        1 - self.active
    }

    pub fn flipped(self) -> Self {
        Self {
            active: self.inactive(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingStep {
    pub read: usize,
    pub write: usize,
    pub weight: f32,
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    /// Buffer the solve gathers into.
    pub gather: usize,
    pub steps: Vec<SmoothingStep>,
    /// Buffer the fade reads from.
    pub fade_source: usize,
}

/// Plans one frame and returns the state for the next.
///
/// With `shrink` each iteration is a Laplacian step followed by a negative
/// step of `SHRINK_FACTOR` times the weight, which cancels the contraction
/// of plain Laplacian smoothing.
pub fn plan_frame(
    ping: PingPong,
    iterations: u32,
    laplace_weight: f32,
    shrink: bool,
) -> (FramePlan, PingPong) {
    let gather = ping.active();
    let mut current = ping;
    let mut steps = Vec::new();

    let mut push = |weight: f32, current: &mut PingPong| {
        steps.push(SmoothingStep {
            read: current.active(),
            write: current.inactive(),
            weight,
        });
        *current = current.flipped();
    };

    for _ in 0..iterations {
        push(laplace_weight, &mut current);
        if shrink {
            push(-SHRINK_FACTOR * laplace_weight, &mut current);
        }
    }

    let plan = FramePlan {
        gather,
        steps,
        fade_source: current.active(),
    };
    (plan, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_iterations_fade_from_gather() {
        let (plan, next) = plan_frame(PingPong::default(), 0, 0.5, true);
        assert!(plan.steps.is_empty());
        assert_eq!(plan.fade_source, plan.gather);
        assert_eq!(next, PingPong::default());
    }
}
