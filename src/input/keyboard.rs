//! Keyboard tracking: turns raw key-down/key-up callbacks into per-tick
//! `keyPressed`, `keyDown` and `keyUp` events.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::bus::EventBus;
use crate::events::{EventKind, KeyEvent, Payload};

/// Identity of a keyboard key, as reported by the host (e.g. `"x"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type KeySet = SmallVec<[Key; 8]>;

#[derive(Debug, Clone, Default)]
struct KeyboardState {
    /// Went down since the last `afterUpdate`.
    pressed: KeySet,
    /// Currently held.
    down: KeySet,
    /// Went up since the last `afterUpdate`.
    up: KeySet,
    /// Pressed and released within the same frame; kept in `down` until `afterUpdate`.
    tapped: KeySet,
}

/// Shared handle to the keyboard tracking state.
///
/// The host keeps one clone to feed raw callbacks; the bus handlers installed
/// by [`Keyboard::attach`] keep another.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    state: Rc<RefCell<KeyboardState>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw key-down callback. Auto-repeat is harmless: a held key is never re-pressed.
    pub fn key_down(&self, key: impl Into<Key>) {
        let key = key.into();
        let mut state = self.state.borrow_mut();

        if !state.pressed.contains(&key) && !state.down.contains(&key) {
            trace!(key = %key, "Key pressed");
            state.pressed.push(key.clone());
        }
        state.tapped.retain(|k| *k != key);
        if !state.down.contains(&key) {
            state.down.push(key);
        }
    }

    /// Raw key-up callback.
    pub fn key_up(&self, key: impl Into<Key>) {
        let key = key.into();
        let mut state = self.state.borrow_mut();

        if state.pressed.contains(&key) && state.down.contains(&key) {
            // A tap shorter than a frame still reports `keyDown` once
            if !state.tapped.contains(&key) {
                state.tapped.push(key.clone());
            }
        } else {
            state.down.retain(|k| *k != key);
        }
        if !state.up.contains(&key) {
            trace!(key = %key, "Key released");
            state.up.push(key);
        }
    }

    /// Focus loss: the hardware state can no longer be trusted, so forget everything.
    pub fn reset(&self) {
        debug!("Resetting keyboard state");
        let mut state = self.state.borrow_mut();
        state.pressed.clear();
        state.down.clear();
        state.up.clear();
        state.tapped.clear();
    }

    /// Clears the one-shot sets; `down` persists until released.
    pub fn end_frame(&self) {
        let mut state = self.state.borrow_mut();
        let tapped = std::mem::take(&mut state.tapped);
        state.down.retain(|k| !tapped.contains(k));
        state.pressed.clear();
        state.up.clear();
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.state.borrow().pressed.iter().any(|k| k == key)
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.state.borrow().down.iter().any(|k| k == key)
    }

    pub fn is_released(&self, key: &str) -> bool {
        self.state.borrow().up.iter().any(|k| k == key)
    }

    pub fn pressed_keys(&self) -> Vec<Key> {
        self.state.borrow().pressed.to_vec()
    }

    pub fn down_keys(&self) -> Vec<Key> {
        self.state.borrow().down.to_vec()
    }

    pub fn released_keys(&self) -> Vec<Key> {
        self.state.borrow().up.to_vec()
    }

    /// Installs the `update` handler that emits key events and the
    /// `afterUpdate` handler that clears the one-shot sets.
    ///
    /// Must run before any application `update` handler is registered.
    pub fn attach<S: 'static>(&self, bus: &mut EventBus<S>) {
        let keyboard = self.clone();
        bus.on(EventKind::Update, move |mut state, _, bus| {
            // Snapshot first: nested handlers may feed raw events.
            let KeyboardState { pressed, down, up, .. } = keyboard.state.borrow().clone();

            for key in pressed {
                state = bus.emit(EventKind::KeyPressed, state, &Payload::Key(KeyEvent { key }))?;
            }
            for key in down {
                state = bus.emit(EventKind::KeyDown, state, &Payload::Key(KeyEvent { key }))?;
            }
            for key in up {
                state = bus.emit(EventKind::KeyUp, state, &Payload::Key(KeyEvent { key }))?;
            }
            Ok(state)
        });

        let keyboard = self.clone();
        bus.on(EventKind::AfterUpdate, move |state, _, _| {
            keyboard.end_frame();
            Ok(state)
        });
    }
}
