use std::cell::Cell;
use std::rc::Rc;

use heks::error::GameError;
use heks::frame_loop::FrameLoop;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

/// Resolves whatever request is pending at `time`, recording the tick timing.
fn fire(frame_loop: &FrameLoop, time: f64, ticks: &Cell<u32>) -> bool {
    match frame_loop.pending_frame() {
        Some(request) => frame_loop
            .resolve(request, time, |_| {
                ticks.set(ticks.get() + 1);
                Ok(())
            })
            .unwrap(),
        None => false,
    }
}

#[test]
fn test_new_loop_is_stopped_with_nothing_pending() {
    let frame_loop = FrameLoop::new();
    assert_that(&frame_loop.is_running()).is_false();
    assert_that(&frame_loop.pending_frame()).is_none();
    assert_that(&frame_loop.frames()).is_equal_to(0);
}

#[test]
fn test_start_arms_a_single_request() {
    let frame_loop = FrameLoop::new();
    frame_loop.start();
    let request = frame_loop.pending_frame();
    assert_that(&request).is_some();

    // Starting again while running changes nothing
    frame_loop.start();
    assert_eq!(frame_loop.pending_frame(), request);
}

#[test]
fn test_each_resolved_tick_arms_the_next() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();

    for i in 0..5 {
        assert_that(&fire(&frame_loop, i as f64 * 16.0, &ticks)).is_true();
    }
    assert_that(&ticks.get()).is_equal_to(5);
    assert_that(&frame_loop.frames()).is_equal_to(5);
    assert_that(&frame_loop.pending_frame()).is_some();
}

#[test]
fn test_first_tick_reports_zero_fps() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();

    fire(&frame_loop, 1234.5, &ticks);
    assert_that(&frame_loop.fps()).is_equal_to(0.0);
    assert_that(&frame_loop.timing().delta()).is_equal_to(0.0);
}

#[test]
fn test_later_ticks_report_fps_from_delta() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();

    fire(&frame_loop, 100.0, &ticks);
    fire(&frame_loop, 125.0, &ticks);
    assert_that(&frame_loop.fps()).is_equal_to(40.0);

    fire(&frame_loop, 135.0, &ticks);
    assert_that(&frame_loop.fps()).is_equal_to(100.0);
    assert_eq!(frame_loop.timing().previous_time, 125.0);
}

#[test]
fn test_tick_callback_sees_current_timing() {
    let frame_loop = FrameLoop::new();
    frame_loop.start();
    let seen = Rc::new(Cell::new(0.0));

    for time in [0.0, 20.0] {
        let request = frame_loop.pending_frame().unwrap();
        let seen = Rc::clone(&seen);
        frame_loop
            .resolve(request, time, move |timing| {
                seen.set(timing.fps());
                Ok(())
            })
            .unwrap();
    }
    assert_that(&seen.get()).is_equal_to(50.0);
}

#[test]
fn test_stop_cancels_the_pending_request() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();
    let request = frame_loop.pending_frame().unwrap();

    frame_loop.stop();
    assert_that(&frame_loop.is_running()).is_false();
    assert_that(&frame_loop.pending_frame()).is_none();

    // The host fired the refresh before it noticed the cancellation
    let ran = frame_loop
        .resolve(request, 16.0, |_| {
            ticks.set(ticks.get() + 1);
            Ok(())
        })
        .unwrap();
    assert_that(&ran).is_false();
    assert_that(&ticks.get()).is_equal_to(0);
}

#[test]
fn test_stop_when_stopped_is_noop() {
    let frame_loop = FrameLoop::new();
    frame_loop.stop();
    frame_loop.stop();
    assert_that(&frame_loop.is_running()).is_false();
}

#[test]
fn test_stale_request_from_previous_run_is_ignored() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();
    let stale = frame_loop.pending_frame().unwrap();
    frame_loop.stop();
    frame_loop.start();

    let ran = frame_loop.resolve(stale, 16.0, |_| Ok(())).unwrap();
    assert_that(&ran).is_false();
    assert_that(&fire(&frame_loop, 32.0, &ticks)).is_true();
}

#[test]
fn test_stop_during_tick_prevents_rearming() {
    let frame_loop = FrameLoop::new();
    frame_loop.start();
    let request = frame_loop.pending_frame().unwrap();

    let handle = frame_loop.clone();
    let ran = frame_loop
        .resolve(request, 0.0, move |_| {
            handle.stop();
            Ok(())
        })
        .unwrap();

    assert_that(&ran).is_true();
    assert_that(&frame_loop.is_running()).is_false();
    assert_that(&frame_loop.pending_frame()).is_none();
}

#[test]
fn test_failed_tick_stops_the_loop() {
    let frame_loop = FrameLoop::new();
    frame_loop.start();
    let request = frame_loop.pending_frame().unwrap();

    let result = frame_loop.resolve(request, 0.0, |_| Err(GameError::InvalidState("boom".to_string())));

    assert!(matches!(result, Err(GameError::InvalidState(_))));
    assert_that(&frame_loop.is_running()).is_false();
    assert_that(&frame_loop.pending_frame()).is_none();
}

#[test]
fn test_stats_cover_recent_deltas() {
    let frame_loop = FrameLoop::new();
    let ticks = Cell::new(0);
    frame_loop.start();

    for i in 0..11 {
        fire(&frame_loop, i as f64 * 10.0, &ticks);
    }

    let stats = frame_loop.stats();
    assert_that(&stats.samples).is_equal_to(10);
    assert_that(&stats.mean_delta).is_close_to(10.0, 1e-9);
    assert_that(&stats.std_dev).is_close_to(0.0, 1e-9);
    assert_that(&stats.average_fps).is_close_to(100.0, 1e-9);
}
