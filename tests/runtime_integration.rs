//! Threaded runtime integration tests

use std::sync::Arc;
use std::time::Duration;

use lamco_motion::config::Config;
use lamco_motion::control::MotionMode;
use lamco_motion::input::InputCommand;
use lamco_motion::motion::Point2D;
use lamco_motion::output::{RecordingDisplay, SinkEvent, StatusDisplay, VirtualCursorSink};
use lamco_motion::runtime::MotionRuntime;
use lamco_motion::scheduler::SchedulingVariant;

fn fast_config(variant: SchedulingVariant) -> Config {
    let mut config = Config::default();
    config.realtime.elevate_priority = false;
    config.scheduler.variant = variant;
    config.scheduler.tick_period_us = 1_000;
    config.input.poll_interval_ms = 1;
    config.motion.initial_sensitivity = 20.0;
    config
}

fn drive(variant: SchedulingVariant) {
    let sink = VirtualCursorSink::new(Point2D::new(0, 0), 100_000);
    let handle = sink.handle();
    let runtime = MotionRuntime::start(&fast_config(variant), Box::new(sink), None).unwrap();
    let commands = runtime.command_sender();

    commands.send(InputCommand::Toggle).unwrap();
    commands.send(InputCommand::Hold).unwrap();
    std::thread::sleep(Duration::from_millis(150));
    commands.send(InputCommand::Release).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    let stats = runtime.shutdown().unwrap();

    assert!(stats.pixels_emitted > 0);
    assert_eq!(i64::from(handle.position().y), stats.pixels_emitted as i64);
    assert_eq!(handle.position().x, 0);
    assert!(handle
        .events()
        .iter()
        .all(|e| matches!(e, SinkEvent::Relative { dx: 0, dy } if (1..=5).contains(dy))));
    assert!(stats.transitions >= 2);
}

#[test]
fn test_deadline_runtime_moves_while_held() {
    drive(SchedulingVariant::Deadline);
}

#[test]
fn test_free_running_runtime_moves_while_held() {
    drive(SchedulingVariant::FreeRunning);
}

#[test]
fn test_disabled_runtime_never_moves() {
    let sink = VirtualCursorSink::new(Point2D::new(0, 0), 0);
    let handle = sink.handle();
    let runtime = MotionRuntime::start(
        &fast_config(SchedulingVariant::Deadline),
        Box::new(sink),
        None,
    )
    .unwrap();

    runtime.command_sender().send(InputCommand::Hold).unwrap();
    std::thread::sleep(Duration::from_millis(30));
    let stats = runtime.shutdown().unwrap();

    assert_eq!(handle.calls(), 0);
    assert_eq!(stats.active_ticks, 0);
}

#[test]
fn test_commands_refresh_display() {
    let display = Arc::new(RecordingDisplay::default());
    let sink = VirtualCursorSink::new(Point2D::new(0, 0), 0);
    let runtime = MotionRuntime::start(
        &fast_config(SchedulingVariant::Deadline),
        Box::new(sink),
        Some(Arc::clone(&display) as Arc<dyn StatusDisplay>),
    )
    .unwrap();
    let controls = runtime.controls();

    let commands = runtime.command_sender();
    commands.send(InputCommand::SetSensitivity(19.99995)).unwrap();
    commands.send(InputCommand::Increase).unwrap();
    commands.send(InputCommand::Increase).unwrap();
    commands.send(InputCommand::SetMode(MotionMode::Curved)).unwrap();
    commands.send(InputCommand::Quit).unwrap();
    runtime.wait().unwrap();

    assert_eq!(controls.sensitivity(), 20.0);
    assert_eq!(controls.motion_mode(), MotionMode::Curved);

    let last = display.reports().last().copied().unwrap();
    assert_eq!(
        last.to_string(),
        "DISABLED | Sensitivity: 20.0000000 | Mode: Curved"
    );
}
