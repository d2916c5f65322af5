use constants::render_settings::SHRINK_FACTOR;
use line_render_engine::engine::opacity::ping_pong::{PingPong, plan_frame};

#[test]
fn smoothing_steps_alternate_buffers() {
    let (plan, next) = plan_frame(PingPong::default(), 3, 0.2, false);

    assert_eq!(plan.gather, 0);
    assert_eq!(plan.steps.len(), 3);
    for step in &plan.steps {
        assert_ne!(step.read, step.write);
        assert_eq!(step.weight, 0.2);
    }
    for pair in plan.steps.windows(2) {
        assert_eq!(pair[1].read, pair[0].write);
    }
    assert_eq!(plan.steps[0].read, plan.gather);
    assert_eq!(plan.fade_source, plan.steps[2].write);
    assert_eq!(next.active(), plan.fade_source);
}

#[test]
fn shrink_doubles_the_steps_and_negates_every_second_one() {
    let (plan, next) = plan_frame(PingPong::default(), 2, 0.5, true);

    let weights: Vec<f32> = plan.steps.iter().map(|step| step.weight).collect();
    assert_eq!(weights, vec![0.5, -SHRINK_FACTOR * 0.5, 0.5, -SHRINK_FACTOR * 0.5]);

    // An even number of flips lands back on the gather buffer
    assert_eq!(plan.fade_source, plan.gather);
    assert_eq!(next, PingPong::default());
}

#[test]
fn active_buffer_carries_into_the_next_frame() {
    let (first, ping) = plan_frame(PingPong::default(), 1, 0.1, false);
    let (second, _) = plan_frame(ping, 1, 0.1, false);

    assert_eq!(second.gather, first.fade_source);
    assert_ne!(second.gather, first.gather);
    assert_eq!(second.steps[0].write, first.gather);
}
