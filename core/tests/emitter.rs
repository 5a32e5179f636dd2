use ema_core::config::{LayoutMode, ScheduleConfig};
use ema_core::emitter::StepKind;
use ema_core::engine::ScheduleEngine;

fn jittered_engine() -> ScheduleEngine {
    // Derived worked default: 4 windows x 150 min, jitter 15, 7 days.
    ScheduleEngine::new(ScheduleConfig::default_test()).unwrap()
}

fn plain_engine() -> ScheduleEngine {
    // Explicit default: two 90-min windows, jitter 0, 7 days.
    ScheduleEngine::new(ScheduleConfig::default()).unwrap()
}

#[test]
fn step_counts_follow_the_schedule_shape() {
    let engine = jittered_engine();
    let artifact = engine.artifact();
    let count = |kind| artifact.steps_of_kind(kind).count();

    assert_eq!(count(StepKind::SeedInput), 1);
    assert_eq!(count(StepKind::StartTimestamp), 1);
    assert_eq!(count(StepKind::Constant), 3);
    assert_eq!(count(StepKind::SeedTransform), 1);
    assert_eq!(count(StepKind::JitterDraw), 7);
    assert_eq!(count(StepKind::JitterOffset), 7);
    assert_eq!(count(StepKind::SampleDraw), 28);
    assert_eq!(count(StepKind::DeliveryTime), 28);
    assert_eq!(artifact.steps.len(), 1 + 1 + 3 + 1 + 7 + 7 + 28 + 28);
}

#[test]
fn disabled_jitter_emits_no_jitter_steps() {
    let engine = plain_engine();
    let artifact = engine.artifact();
    assert_eq!(artifact.steps_of_kind(StepKind::JitterDraw).count(), 0);
    assert_eq!(artifact.steps_of_kind(StepKind::JitterOffset).count(), 0);
    assert_eq!(artifact.steps_of_kind(StepKind::SampleDraw).count(), 14);
}

#[test]
fn draw_chain_is_strictly_linear() {
    for engine in [jittered_engine(), plain_engine()] {
        let artifact = engine.artifact();
        let draws: Vec<_> = artifact.draw_steps().collect();
        for pair in draws.windows(2) {
            assert_eq!(
                pair[1].depends_on.as_deref(),
                Some(pair[0].name.as_str()),
                "{} must chain from {}",
                pair[1].name,
                pair[0].name
            );
            assert!(
                pair[1].expression.contains(&format!("[{}]", pair[0].name)),
                "{} expression must reference its predecessor",
                pair[1].name
            );
        }
    }
}

#[test]
fn chain_runs_seed_then_jitter_block_then_sample_block() {
    let engine = jittered_engine();
    let names: Vec<&str> = engine
        .artifact()
        .draw_steps()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names[0], "seed");
    assert_eq!(&names[1..8], &[
        "jitter_d01", "jitter_d02", "jitter_d03", "jitter_d04",
        "jitter_d05", "jitter_d06", "jitter_d07",
    ]);
    assert_eq!(names[8], "rand_01");
    assert_eq!(*names.last().unwrap(), "rand_28");
}

#[test]
fn seed_field_encodes_the_warmup_expression() {
    let engine = plain_engine();
    let artifact = engine.artifact();
    let seed = artifact
        .steps_of_kind(StepKind::SeedTransform)
        .next()
        .unwrap();
    assert_eq!(
        seed.expression,
        "mod((([a] * mod((([a] * mod((([a] * [seed_input]) + [c]), [m])) + [c]), [m])) + [c]), [m])"
    );
    assert_eq!(seed.depends_on.as_deref(), Some("seed_input"));
}

#[test]
fn constants_carry_their_literal_values() {
    let engine = plain_engine();
    let annotations: Vec<&str> = engine
        .artifact()
        .steps_of_kind(StepKind::Constant)
        .map(|s| s.annotation.as_str())
        .collect();
    assert_eq!(annotations, vec![
        "@DEFAULT='1664525' @HIDDEN",
        "@DEFAULT='1013904223' @HIDDEN",
        "@DEFAULT='4294967296' @HIDDEN",
    ]);
}

#[test]
fn delivery_annotations_encode_day_offset_and_window() {
    let engine = plain_engine();
    let artifact = engine.artifact();
    let deliveries: Vec<_> = artifact.steps_of_kind(StepKind::DeliveryTime).collect();

    // Day 1 sample 1: window 9:15 x 90, rand_01.
    assert_eq!(deliveries[0].name, "ema_deliver_at_d01_s01");
    assert_eq!(
        deliveries[0].annotation,
        "@CALCDATE([ema_start_at], (0 * 1440) + 555 + mod([rand_01], 90), 'm')"
    );

    // Day 7 sample 2: last sample, rand_14.
    let last = deliveries.last().unwrap();
    assert_eq!(last.name, "ema_deliver_at_d07_s02");
    assert_eq!(
        last.annotation,
        "@CALCDATE([ema_start_at], (6 * 1440) + 795 + mod([rand_14], 90), 'm')"
    );
}

#[test]
fn jittered_delivery_annotations_reference_the_day_offset_field() {
    let engine = jittered_engine();
    let artifact = engine.artifact();
    let first = artifact.steps_of_kind(StepKind::DeliveryTime).next().unwrap();
    assert_eq!(
        first.annotation,
        "@CALCDATE([ema_start_at], (0 * 1440) + 555 + [jitter_offset_d01] + mod([rand_01], 150), 'm')"
    );
}

#[test]
fn jitter_offset_steps_reduce_their_days_draw() {
    let engine = jittered_engine();
    let artifact = engine.artifact();
    let offsets: Vec<_> = artifact.steps_of_kind(StepKind::JitterOffset).collect();
    assert_eq!(offsets[0].name, "jitter_offset_d01");
    assert_eq!(offsets[0].expression, "mod([jitter_d01], 30) - 15");
    assert_eq!(offsets[0].depends_on.as_deref(), Some("jitter_d01"));
}

#[test]
fn events_cover_every_day_window_pair() {
    let engine = jittered_engine();
    let artifact = engine.artifact();
    assert_eq!(artifact.events.len(), 28);
    assert_eq!(artifact.events[0].event_name, "ema_d01_s01");
    assert_eq!(artifact.events[27].event_name, "ema_d07_s04");

    let mut seen = std::collections::HashSet::new();
    for binding in &artifact.events {
        assert!(seen.insert((binding.day, binding.window)), "duplicate event binding");
    }
}

#[test]
fn empty_layout_emits_empty_artifact() {
    let mut config = ScheduleConfig::default();
    config.layout = LayoutMode::Derived {
        day_start: 600,
        day_end: 600,
        samples_per_day: 4,
        min_gap: 30,
    };
    let engine = ScheduleEngine::new(config).unwrap();
    assert!(engine.artifact().is_empty());
    assert!(engine.artifact().steps.is_empty());
    assert!(engine.artifact().events.is_empty());
}
