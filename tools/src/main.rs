//! ema-runner: headless schedule builder for EMA studies.
//!
//! Usage:
//!   ema-runner --project study.json --out ./export
//!   ema-runner --trials 10000 --master-seed 42
//!   ema-runner --preview-seed 12345 --start "2026-03-02 00:00"

use anyhow::Result;
use chrono::NaiveDateTime;
use ema_core::{
    config::ScheduleConfig,
    diagnostics::DEFAULT_TRIALS,
    engine::ScheduleEngine,
    export,
    snapshot::ProjectSnapshot,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let project = string_arg(&args, "--project");
    let out_dir = string_arg(&args, "--out").unwrap_or_else(|| "./out".to_string());
    let trials = parse_arg(&args, "--trials", DEFAULT_TRIALS);
    let master_seed = parse_arg(&args, "--master-seed", 42u64);
    let preview_seed = string_arg(&args, "--preview-seed");
    let start = string_arg(&args, "--start");
    let save_project = string_arg(&args, "--save-project");

    let config = match &project {
        Some(path) => ScheduleConfig::load(path)?,
        None => ScheduleConfig::default(),
    };

    println!("EMA Schedule Kit — ema-runner");
    println!("  project:     {}", project.as_deref().unwrap_or("(defaults)"));
    println!("  out dir:     {out_dir}");
    println!("  trials:      {trials}");
    println!("  master seed: {master_seed}");
    println!();

    let engine = ScheduleEngine::new(config)?;
    log::debug!(
        "derived {} windows, {} samples",
        engine.layout().windows.len(),
        engine.samples().len()
    );

    for warning in engine.warnings() {
        println!("  warning: {warning}");
    }

    if !engine.is_configured() {
        println!("No schedule configured — nothing to export yet.");
        return Ok(());
    }

    print_schedule(&engine);
    print_conflicts(&engine);
    write_exports(&engine, &out_dir)?;

    let report = engine.run_diagnostics(trials, master_seed);
    print_histogram(&engine, &report);

    if let Some(raw) = preview_seed {
        let seed: u64 = raw.parse()?;
        let start_at = match start {
            Some(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M")?,
            None => chrono::Local::now().naive_local(),
        };
        print_preview(&engine, seed, start_at);
    }

    if let Some(path) = save_project {
        ProjectSnapshot::capture(engine.config()).write(&path)?;
        println!("Project saved to {path}");
    }

    Ok(())
}

fn print_schedule(engine: &ScheduleEngine) {
    let layout = engine.layout();
    println!("=== SCHEDULE ===");
    println!("  days:    {}", engine.config().num_days);
    println!("  jitter:  +/- {} min", layout.jitter);
    for (i, w) in layout.windows.iter().enumerate() {
        println!(
            "  window {}: {} - {} ({} min)",
            i + 1,
            fmt_time(w.start),
            fmt_time(w.end()),
            w.duration
        );
    }
    println!("  samples: {}", engine.samples().len());
    println!();
}

fn print_conflicts(engine: &ScheduleEngine) {
    for conflict in engine.conflicts() {
        println!(
            "  {:?} between windows {} and {}: {} - {}",
            conflict.kind,
            conflict.earlier + 1,
            conflict.later + 1,
            fmt_time(conflict.start),
            fmt_time(conflict.end)
        );
    }
    if !engine.conflicts().is_empty() {
        println!();
    }
}

fn write_exports(engine: &ScheduleEngine, out_dir: &str) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let config = engine.config();
    let artifact = engine.artifact();

    let files = [
        ("data_dictionary.csv", export::data_dictionary_csv(config, artifact)),
        ("events.csv", export::events_csv(config, artifact)),
        ("event_mappings.csv", export::event_mappings_csv(config, artifact)),
        ("asi_list.csv", export::asi_csv(config, artifact)),
    ];
    for (name, content) in files {
        let path = Path::new(out_dir).join(name);
        std::fs::write(&path, content)?;
        println!("  wrote {}", path.display());
    }
    println!();
    Ok(())
}

fn print_histogram(engine: &ScheduleEngine, report: &ema_core::diagnostics::SimulationReport) {
    let hist = &report.histogram;
    println!("=== COVERAGE ({} trials, {} draws) ===", report.trials, report.total_draws);
    for window in 0..engine.layout().windows.len() {
        println!("  window {}: {} hits", window + 1, hist.window_total(window));
    }

    // Coarse stacked view: one row per non-empty hour.
    let buckets_per_hour = (60 / hist.bucket_minutes) as usize;
    let max_hour_total = (0..hist.counts.len())
        .step_by(buckets_per_hour.max(1))
        .map(|b| hour_total(hist, b, buckets_per_hour))
        .max()
        .unwrap_or(0);
    if max_hour_total == 0 {
        return;
    }
    for hour_start in (0..hist.counts.len()).step_by(buckets_per_hour.max(1)) {
        let total = hour_total(hist, hour_start, buckets_per_hour);
        if total == 0 {
            continue;
        }
        let offset = hist.origin + hour_start as i64 * hist.bucket_minutes;
        let bar = "#".repeat((total * 40 / max_hour_total) as usize);
        println!("  {} |{bar} {total}", fmt_time(offset));
    }
    println!();
}

fn hour_total(
    hist: &ema_core::diagnostics::Histogram,
    from_bucket: usize,
    buckets_per_hour: usize,
) -> u64 {
    (from_bucket..(from_bucket + buckets_per_hour).min(hist.counts.len()))
        .map(|b| hist.bucket_total(b))
        .sum()
}

fn print_preview(engine: &ScheduleEngine, seed: u64, start_at: NaiveDateTime) {
    println!("=== PREVIEW (seed {seed}, start {start_at}) ===");
    for entry in engine.preview(seed, start_at) {
        println!(
            "  day {:>2} sample {}: {}",
            entry.day,
            entry.window + 1,
            entry.deliver_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
}

fn fmt_time(minutes: i64) -> String {
    let total = minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
