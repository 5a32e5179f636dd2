use ema_core::config::ScheduleConfig;
use ema_core::engine::ScheduleEngine;

#[test]
fn sample_count_is_days_times_windows() {
    let engine = ScheduleEngine::new(ScheduleConfig::default_test()).unwrap();
    assert_eq!(engine.layout().windows.len(), 4);
    assert_eq!(engine.samples().len(), 7 * 4);
}

#[test]
fn samples_are_day_major_then_window_order() {
    let engine = ScheduleEngine::new(ScheduleConfig::default_test()).unwrap();
    let samples = engine.samples();

    let mut expected_day = 1;
    let mut expected_window = 0;
    for sample in samples {
        assert_eq!(sample.day, expected_day);
        assert_eq!(sample.window, expected_window);
        expected_window += 1;
        if expected_window == 4 {
            expected_window = 0;
            expected_day += 1;
        }
    }
}

#[test]
fn samples_carry_their_windows_timing() {
    let engine = ScheduleEngine::new(ScheduleConfig::default_test()).unwrap();
    for sample in engine.samples() {
        let window = &engine.layout().windows[sample.window];
        assert_eq!(sample.start, window.start);
        assert_eq!(sample.duration, window.duration);
    }
}

#[test]
fn zero_days_means_no_samples_and_empty_artifact() {
    let mut config = ScheduleConfig::default_test();
    config.num_days = 0;
    let engine = ScheduleEngine::new(config).unwrap();
    assert!(engine.samples().is_empty());
    assert!(!engine.is_configured());
    assert!(engine.artifact().steps.is_empty());
}
