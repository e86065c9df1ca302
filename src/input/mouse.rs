//! Mouse tracking: button transitions plus a pointer position clamped to the canvas.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{IVec2, UVec2, Vec2};
use smallvec::SmallVec;
use strum_macros::{Display, FromRepr};
use tracing::{debug, trace};

use crate::bus::EventBus;
use crate::events::{EventKind, MouseEvent, Payload};
use crate::surface::DisplayBounds;

/// A pointer button, numbered the way hardware reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Middle = 1,
    Right = 2,
    Back = 3,
    Forward = 4,
}

impl MouseButton {
    /// Maps a raw button ordinal; anything outside `0..=4` is not a button we track.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::from_repr(ordinal)
    }
}

type ButtonSet = SmallVec<[MouseButton; 5]>;

#[derive(Debug, Clone)]
struct MouseState {
    pressed: ButtonSet,
    down: ButtonSet,
    up: ButtonSet,
    /// Pressed and released within the same frame; kept in `down` until `afterUpdate`.
    clicked: ButtonSet,
    position: IVec2,
    previous_position: IVec2,
    canvas_size: UVec2,
}

/// Shared handle to the mouse tracking state.
#[derive(Debug, Clone)]
pub struct Mouse {
    state: Rc<RefCell<MouseState>>,
}

impl Mouse {
    /// Creates a tracker for a canvas of `canvas_size` intrinsic pixels.
    pub fn new(canvas_size: UVec2) -> Self {
        Self {
            state: Rc::new(RefCell::new(MouseState {
                pressed: ButtonSet::new(),
                down: ButtonSet::new(),
                up: ButtonSet::new(),
                clicked: ButtonSet::new(),
                position: IVec2::ZERO,
                previous_position: IVec2::ZERO,
                canvas_size,
            })),
        }
    }

    /// Raw button-down callback. Unknown ordinals are ignored.
    pub fn button_down(&self, ordinal: u8) {
        match MouseButton::from_ordinal(ordinal) {
            Some(button) => self.press(button),
            None => trace!(ordinal, "Ignoring unknown mouse button"),
        }
    }

    /// Raw button-up callback. Unknown ordinals are ignored.
    pub fn button_up(&self, ordinal: u8) {
        match MouseButton::from_ordinal(ordinal) {
            Some(button) => self.release(button),
            None => trace!(ordinal, "Ignoring unknown mouse button"),
        }
    }

    pub fn press(&self, button: MouseButton) {
        let mut state = self.state.borrow_mut();

        if !state.pressed.contains(&button) && !state.down.contains(&button) {
            trace!(%button, "Mouse button pressed");
            state.pressed.push(button);
        }
        state.clicked.retain(|b| *b != button);
        if !state.down.contains(&button) {
            state.down.push(button);
        }
    }

    pub fn release(&self, button: MouseButton) {
        let mut state = self.state.borrow_mut();

        if state.pressed.contains(&button) && state.down.contains(&button) {
            if !state.clicked.contains(&button) {
                state.clicked.push(button);
            }
        } else {
            state.down.retain(|b| *b != button);
        }
        if !state.up.contains(&button) {
            trace!(%button, "Mouse button released");
            state.up.push(button);
        }
    }

    /// Raw pointer-move callback with client coordinates.
    ///
    /// The position is rescaled from the displayed size to the intrinsic canvas
    /// size, then rounded and clamped into `[0, width] x [0, height]`. A displayed
    /// box with no area carries no usable scale and leaves the position as is.
    pub fn pointer_move(&self, client: Vec2, bounds: DisplayBounds) {
        let mut state = self.state.borrow_mut();
        let canvas = state.canvas_size.as_vec2();

        let scale = bounds.size / canvas;
        if !(scale.x > 0.0 && scale.y > 0.0) || !scale.is_finite() || !client.is_finite() {
            trace!(?client, ?bounds, "Ignoring pointer move without a usable scale");
            return;
        }

        let scaled = (client - bounds.origin) / scale;
        state.position = scaled.clamp(Vec2::ZERO, canvas).round().as_ivec2();
    }

    /// Focus loss: forget every button. The pointer position is kept.
    pub fn reset(&self) {
        debug!("Resetting mouse buttons");
        let mut state = self.state.borrow_mut();
        state.pressed.clear();
        state.down.clear();
        state.up.clear();
        state.clicked.clear();
    }

    /// Snapshots the position for move detection and clears the one-shot sets.
    pub fn end_frame(&self) {
        let mut state = self.state.borrow_mut();
        state.previous_position = state.position;
        let clicked = std::mem::take(&mut state.clicked);
        state.down.retain(|b| !clicked.contains(b));
        state.pressed.clear();
        state.up.clear();
    }

    pub fn position(&self) -> IVec2 {
        self.state.borrow().position
    }

    pub fn canvas_size(&self) -> UVec2 {
        self.state.borrow().canvas_size
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.state.borrow().pressed.contains(&button)
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.state.borrow().down.contains(&button)
    }

    pub fn is_released(&self, button: MouseButton) -> bool {
        self.state.borrow().up.contains(&button)
    }

    /// Installs the `update` handler that emits mouse events and the
    /// `afterUpdate` handler that snapshots and clears.
    pub fn attach<S: 'static>(&self, bus: &mut EventBus<S>) {
        let mouse = self.clone();
        bus.on(EventKind::Update, move |mut state, _, bus| {
            let MouseState {
                pressed,
                down,
                up,
                position,
                previous_position,
                ..
            } = mouse.state.borrow().clone();

            if position != previous_position {
                let payload = Payload::Mouse(MouseEvent { button: None, position });
                state = bus.emit(EventKind::MouseMove, state, &payload)?;
            }

            let events = [(EventKind::MouseDown, down), (EventKind::MousePressed, pressed), (EventKind::MouseUp, up)];
            for (kind, buttons) in events {
                for button in buttons {
                    let payload = Payload::Mouse(MouseEvent {
                        button: Some(button),
                        position,
                    });
                    state = bus.emit(kind.clone(), state, &payload)?;
                }
            }
            Ok(state)
        });

        let mouse = self.clone();
        bus.on(EventKind::AfterUpdate, move |state, _, _| {
            mouse.end_frame();
            Ok(state)
        });
    }
}
