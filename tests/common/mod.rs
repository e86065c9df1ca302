#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use heks::events::EventKind;
use heks::game::{Game, GameConfig};
use heks::surface::Color;

/// Milliseconds between simulated display refreshes (60 Hz).
pub const FRAME_MS: f64 = 1000.0 / 60.0;

pub fn test_config() -> GameConfig {
    GameConfig::new(32, 24).with_background(Color::BLUE)
}

/// A started game with a small canvas.
pub fn started_game<S: 'static>(state: S) -> Game<S> {
    let mut game = Game::new(test_config(), state).unwrap();
    game.start().unwrap();
    game
}

/// Fires `count` refreshes, one frame apart, starting at `from`. Returns the last timestamp used.
pub fn run_frames<S: 'static>(game: &mut Game<S>, from: f64, count: usize) -> f64 {
    let mut time = from;
    for _ in 0..count {
        time += FRAME_MS;
        game.refresh(time).unwrap();
    }
    time
}

/// Shared log of event names, appended to by handlers installed with [`record`].
#[derive(Debug, Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }
}

/// Registers a handler on each of `kinds` that logs `name[:detail]` and passes the state through.
pub fn record<S: 'static>(game: &mut Game<S>, recorder: &Recorder, kinds: &[EventKind]) {
    for kind in kinds {
        let recorder = recorder.clone();
        let name = kind.to_string();
        game.on(kind.clone(), move |state, payload, _| {
            let detail = match (payload.key(), payload.mouse()) {
                (Some(event), _) => format!("{name}:{}", event.key),
                (_, Some(event)) => match event.button {
                    Some(button) => format!("{name}:{button}"),
                    None => format!("{name}:{},{}", event.position.x, event.position.y),
                },
                _ => name.clone(),
            };
            recorder.push(detail);
            Ok(state)
        });
    }
}
