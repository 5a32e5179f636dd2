//! Calculation-field emission — the schedule rendered as a chain of
//! named expressions the host platform evaluates per record.
//!
//! RULE: The chain is strictly linear. The destination engine has no
//! iteration construct, so the chain IS the loop, unrolled: every draw
//! step's expression references exactly the preceding draw step by
//! name, and `depends_on` records that edge explicitly. Field names
//! embed the day-major sample ordinal from `schedule::expand` — the
//! two must never disagree.

use serde::{Deserialize, Serialize};

use crate::config::{NamingConfig, ScheduleConfig};
use crate::layout::WindowLayout;
use crate::rng::{LCG_A, LCG_C, LCG_M, SEED_WARMUP_STEPS};
use crate::schedule::SampleInstance;
use crate::types::{Day, MINUTES_PER_DAY};

/// Name of the processed-seed calc field. Fixed: every chain draw
/// hangs off it, and the import side looks for it by name.
pub const SEED_STEP_NAME: &str = "seed";

/// What a single emitted step is for. Drives form placement, field
/// types, and annotations in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Raw seed entry field (defaults to the record name).
    SeedInput,
    /// Study start date/time field.
    StartTimestamp,
    /// One of the hidden LCG constant fields (a, c, m).
    Constant,
    /// The warmed-up seed: three nested steps over the raw seed.
    SeedTransform,
    /// One per-day LCG draw feeding the jitter offset.
    JitterDraw,
    /// Pure arithmetic: the day's draw reduced to a signed offset.
    JitterOffset,
    /// One LCG draw per sample, in expander order.
    SampleDraw,
    /// The per-sample delivery instant.
    DeliveryTime,
}

/// One named calculation step in the emitted chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalcStep {
    pub name: String,
    pub form: String,
    pub label: String,
    pub kind: StepKind,
    /// Calculation expression; empty for non-calc fields.
    pub expression: String,
    /// Field annotation (`@HIDDEN`, `@DEFAULT=...`, `@CALCDATE(...)`);
    /// empty if none.
    pub annotation: String,
    /// The single prior field this step consumes, if any.
    pub depends_on: Option<String>,
}

/// One scheduled event: a distinct (day, window) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventBinding {
    pub day: Day,
    pub window: usize,
    pub event_name: String,
}

/// The complete emitted result: the ordered step chain, the samples it
/// was generated from, and the event bindings. Recomputed in full on
/// every parameter change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleArtifact {
    pub steps: Vec<CalcStep>,
    pub samples: Vec<SampleInstance>,
    pub events: Vec<EventBinding>,
}

impl ScheduleArtifact {
    /// The valid "no schedule configured" state.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn steps_of_kind(&self, kind: StepKind) -> impl Iterator<Item = &CalcStep> {
        self.steps.iter().filter(move |s| s.kind == kind)
    }

    /// The LCG draw steps in chain order (seed transform, jitter
    /// draws, sample draws).
    pub fn draw_steps(&self) -> impl Iterator<Item = &CalcStep> {
        self.steps.iter().filter(|s| {
            matches!(
                s.kind,
                StepKind::SeedTransform | StepKind::JitterDraw | StepKind::SampleDraw
            )
        })
    }
}

// ── Field naming ─────────────────────────────────────────────────
//
// Names are generated here and only here; export and import reuse
// these helpers instead of re-deriving ordinals at call sites.

pub fn rand_field_name(naming: &NamingConfig, ordinal: usize) -> String {
    format!("{}_{:02}", naming.rand_prefix, ordinal)
}

pub fn jitter_field_name(naming: &NamingConfig, day: Day) -> String {
    format!("{}_d{:02}", naming.jitter_prefix, day)
}

pub fn jitter_offset_field_name(naming: &NamingConfig, day: Day) -> String {
    format!("{}_offset_d{:02}", naming.jitter_prefix, day)
}

pub fn deliver_field_name(naming: &NamingConfig, day: Day, sample_number: u32) -> String {
    format!("{}_d{:02}_s{:02}", naming.deliver_at_prefix, day, sample_number)
}

pub fn event_name(naming: &NamingConfig, day: Day, sample_number: u32) -> String {
    format!("{}_d{:02}_s{:02}", naming.event_prefix, day, sample_number)
}

// ── Expression text ──────────────────────────────────────────────

/// One LCG step over an inner expression, in the host platform's
/// arithmetic: `mod((([a] * inner) + [c]), [m])`.
fn step_expr(naming: &NamingConfig, inner: &str) -> String {
    format!(
        "mod((([{a}] * {inner}) + [{c}]), [{m}])",
        a = naming.field_name_a,
        c = naming.field_name_c,
        m = naming.field_name_m,
    )
}

/// The warm-up rendered as nested steps over the raw seed field.
/// Nesting depth comes from the shared constant, so the simulator and
/// this expression cannot drift apart.
fn seed_transform_expr(naming: &NamingConfig) -> String {
    let mut expr = format!("[{}]", naming.seed_field);
    for _ in 0..SEED_WARMUP_STEPS {
        expr = step_expr(naming, &expr);
    }
    expr
}

/// The `@CALCDATE` annotation computing a sample's delivery instant as
/// minutes added to the start timestamp.
fn delivery_annotation(
    naming: &NamingConfig,
    sample: &SampleInstance,
    rand_field: &str,
    jittered: bool,
) -> String {
    let jitter_term = if jittered {
        format!("[{}] + ", jitter_offset_field_name(naming, sample.day))
    } else {
        String::new()
    };
    format!(
        "@CALCDATE([{start}], ({days_elapsed} * {minutes_per_day}) + {window_start} + {jitter_term}mod([{rand_field}], {duration}), 'm')",
        start = naming.start_field,
        days_elapsed = sample.day - 1,
        minutes_per_day = MINUTES_PER_DAY,
        window_start = sample.start,
        duration = sample.duration,
    )
}

// ── Chain construction ───────────────────────────────────────────

/// Build the full artifact for the current configuration. Zero
/// windows or zero samples produce an empty artifact — a valid,
/// displayable state, not an error.
pub fn emit(
    config: &ScheduleConfig,
    layout: &WindowLayout,
    samples: &[SampleInstance],
) -> ScheduleArtifact {
    if layout.is_empty() || samples.is_empty() {
        return ScheduleArtifact::default();
    }

    let naming = &config.naming;
    let form = naming.config_form.clone();
    let jittered = layout.jitter > 0;
    let mut steps = Vec::new();

    steps.push(CalcStep {
        name: naming.seed_field.clone(),
        form: form.clone(),
        label: "Seed input".into(),
        kind: StepKind::SeedInput,
        expression: String::new(),
        annotation: "@DEFAULT='[record-name]' @HIDDEN".into(),
        depends_on: None,
    });
    steps.push(CalcStep {
        name: naming.start_field.clone(),
        form: form.clone(),
        label: "EMA start date/time".into(),
        kind: StepKind::StartTimestamp,
        expression: String::new(),
        annotation: String::new(),
        depends_on: None,
    });

    for (name, label, value) in [
        (&naming.field_name_a, "LCG multiplier (a)", LCG_A),
        (&naming.field_name_c, "LCG increment (c)", LCG_C),
        (&naming.field_name_m, "LCG modulus (m)", LCG_M),
    ] {
        steps.push(CalcStep {
            name: name.clone(),
            form: form.clone(),
            label: label.into(),
            kind: StepKind::Constant,
            expression: String::new(),
            annotation: format!("@DEFAULT='{value}' @HIDDEN"),
            depends_on: None,
        });
    }

    steps.push(CalcStep {
        name: SEED_STEP_NAME.into(),
        form: form.clone(),
        label: "Seed (processed)".into(),
        kind: StepKind::SeedTransform,
        expression: seed_transform_expr(naming),
        annotation: "@HIDDEN".into(),
        depends_on: Some(naming.seed_field.clone()),
    });

    // Jitter block: one draw per day, then one arithmetic offset per
    // day, both in day order. Disabled jitter emits neither.
    let mut prev_draw = SEED_STEP_NAME.to_string();
    if jittered {
        for day in 1..=config.num_days {
            let name = jitter_field_name(naming, day);
            steps.push(CalcStep {
                name: name.clone(),
                form: form.clone(),
                label: format!("Jitter draw day {day:02}"),
                kind: StepKind::JitterDraw,
                expression: step_expr(naming, &format!("[{prev_draw}]")),
                annotation: "@HIDDEN".into(),
                depends_on: Some(prev_draw.clone()),
            });
            prev_draw = name;
        }
        for day in 1..=config.num_days {
            let source = jitter_field_name(naming, day);
            steps.push(CalcStep {
                name: jitter_offset_field_name(naming, day),
                form: form.clone(),
                label: format!("Jitter offset day {day:02}"),
                kind: StepKind::JitterOffset,
                expression: format!(
                    "mod([{source}], {range}) - {radius}",
                    range = 2 * layout.jitter,
                    radius = layout.jitter,
                ),
                annotation: "@HIDDEN".into(),
                depends_on: Some(source),
            });
        }
    }

    // Sample block: one draw per sample in expander order, chained
    // from the last jitter draw (or the processed seed).
    for (index, _) in samples.iter().enumerate() {
        let name = rand_field_name(naming, index + 1);
        steps.push(CalcStep {
            name: name.clone(),
            form: form.clone(),
            label: format!("Random {:02}", index + 1),
            kind: StepKind::SampleDraw,
            expression: step_expr(naming, &format!("[{prev_draw}]")),
            annotation: "@HIDDEN".into(),
            depends_on: Some(prev_draw.clone()),
        });
        prev_draw = name;
    }

    for (index, sample) in samples.iter().enumerate() {
        let rand_field = rand_field_name(naming, index + 1);
        steps.push(CalcStep {
            name: deliver_field_name(naming, sample.day, sample.sample_number()),
            form: form.clone(),
            label: format!("Day {} Sample {}", sample.day, sample.sample_number()),
            kind: StepKind::DeliveryTime,
            expression: String::new(),
            annotation: delivery_annotation(naming, sample, &rand_field, jittered),
            depends_on: Some(rand_field),
        });
    }

    let events = samples
        .iter()
        .map(|s| EventBinding {
            day: s.day,
            window: s.window,
            event_name: event_name(naming, s.day, s.sample_number()),
        })
        .collect();

    log::debug!(
        "emitted {} steps for {} samples (jitter {})",
        steps.len(),
        samples.len(),
        layout.jitter
    );

    ScheduleArtifact {
        steps,
        samples: samples.to_vec(),
        events,
    }
}
