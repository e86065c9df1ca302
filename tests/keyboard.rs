mod common;

use common::{record, run_frames, started_game, Recorder};
use heks::events::EventKind;
use heks::input::{Key, Keyboard};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

const KEY_EVENTS: [EventKind; 3] = [EventKind::KeyPressed, EventKind::KeyDown, EventKind::KeyUp];

#[test]
fn test_key_press_fires_pressed_once_and_down_while_held() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &KEY_EVENTS);

    game.keyboard().key_down("x");
    let time = run_frames(&mut game, 0.0, 1);
    assert_eq!(recorder.entries(), vec!["keyPressed:x", "keyDown:x"]);

    recorder.clear();
    run_frames(&mut game, time, 2);
    assert_eq!(recorder.entries(), vec!["keyDown:x", "keyDown:x"]);
}

#[test]
fn test_key_release_fires_up_once() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &KEY_EVENTS);

    game.keyboard().key_down("x");
    let time = run_frames(&mut game, 0.0, 1);
    recorder.clear();

    game.keyboard().key_up("x");
    let time = run_frames(&mut game, time, 1);
    assert_eq!(recorder.entries(), vec!["keyUp:x"]);

    recorder.clear();
    run_frames(&mut game, time, 1);
    assert_that(&recorder.entries()).is_empty();
}

#[test]
fn test_tap_within_one_frame_fires_pressed_down_and_up() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &KEY_EVENTS);

    game.keyboard().key_down("x");
    game.keyboard().key_up("x");
    let time = run_frames(&mut game, 0.0, 1);
    assert_eq!(recorder.entries(), vec!["keyPressed:x", "keyDown:x", "keyUp:x"]);
    assert_that(&game.keyboard().is_down("x")).is_false();

    recorder.clear();
    run_frames(&mut game, time, 1);
    assert_that(&recorder.entries()).is_empty();
}

#[test]
fn test_auto_repeat_does_not_press_again() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &KEY_EVENTS);

    game.keyboard().key_down("a");
    let time = run_frames(&mut game, 0.0, 1);
    game.keyboard().key_down("a");
    game.keyboard().key_down("a");
    run_frames(&mut game, time, 1);

    assert_that(&recorder.count("keyPressed:a")).is_equal_to(1);
    assert_that(&recorder.count("keyDown:a")).is_equal_to(2);
}

#[test]
fn test_keys_are_reported_in_arrival_order() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &[EventKind::KeyPressed]);

    game.keyboard().key_down("b");
    game.keyboard().key_down("a");
    game.keyboard().key_down("Shift");
    run_frames(&mut game, 0.0, 1);

    assert_eq!(recorder.entries(), vec!["keyPressed:b", "keyPressed:a", "keyPressed:Shift"]);
}

#[test]
fn test_one_shot_sets_are_empty_after_update() {
    let mut game = started_game(());
    let keyboard = game.keyboard().clone();
    let observed = Recorder::default();
    let log = observed.clone();
    let probe = keyboard.clone();
    game.on(EventKind::BeforeDraw, move |state, _, _| {
        log.push(format!(
            "pressed={} up={} down={}",
            probe.pressed_keys().len(),
            probe.released_keys().len(),
            probe.down_keys().len()
        ));
        Ok(state)
    });

    keyboard.key_down("a");
    keyboard.key_down("b");
    keyboard.key_up("c");
    run_frames(&mut game, 0.0, 1);

    assert_eq!(observed.entries(), vec!["pressed=0 up=0 down=2"]);
}

#[test]
fn test_focus_loss_forgets_all_keys() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    record(&mut game, &recorder, &KEY_EVENTS);

    game.keyboard().key_down("a");
    let time = run_frames(&mut game, 0.0, 1);
    game.keyboard().key_down("b");
    game.keyboard().key_up("c");
    game.focus_lost();

    assert_that(&game.keyboard().down_keys()).is_empty();
    assert_that(&game.keyboard().pressed_keys()).is_empty();
    assert_that(&game.keyboard().released_keys()).is_empty();

    recorder.clear();
    run_frames(&mut game, time, 1);
    assert_that(&recorder.entries()).is_empty();
}

#[test]
fn test_trackers_are_independent_per_instance() {
    let first = Keyboard::new();
    let second = Keyboard::new();
    first.key_down("a");

    assert_that(&first.is_down("a")).is_true();
    assert_that(&second.is_down("a")).is_false();
    assert_eq!(first.down_keys(), vec![Key::from("a")]);
}

#[test]
fn test_key_fed_from_a_handler_is_only_seen_as_held() {
    let mut game = started_game(());
    let recorder = Recorder::default();
    let keyboard = game.keyboard().clone();
    game.on(EventKind::KeyPressed, move |state, payload, _| {
        if payload.key().is_some_and(|event| event.key == "a") {
            keyboard.key_down("b");
        }
        Ok(state)
    });
    record(&mut game, &recorder, &[EventKind::KeyPressed]);

    game.keyboard().key_down("a");
    let time = run_frames(&mut game, 0.0, 1);
    assert_eq!(recorder.entries(), vec!["keyPressed:a"]);

    // The press edge is cleared by afterUpdate of the tick that fed it
    recorder.clear();
    run_frames(&mut game, time, 1);
    assert_that(&recorder.entries()).is_empty();
    assert_that(&game.keyboard().is_down("b")).is_true();
}
