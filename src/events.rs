//! Event names and the payloads carried alongside them.

use std::any::Any;
use std::rc::Rc;

use glam::IVec2;
use strum_macros::{Display, EnumString};

use crate::input::{Key, MouseButton};
use crate::surface::Context;

/// The name an event is emitted and listened for under.
///
/// Names parse from (and display as) their camelCase form, e.g. `"keyPressed"`.
/// Any other string is an application-defined [`EventKind::Custom`] name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum EventKind {
    Start,
    Tick,
    BeforeUpdate,
    Update,
    AfterUpdate,
    BeforeDraw,
    Draw,
    AfterDraw,
    KeyPressed,
    KeyDown,
    KeyUp,
    MouseMove,
    MouseDown,
    MousePressed,
    MouseUp,
    #[strum(default)]
    Custom(String),
}

impl EventKind {
    /// The phases emitted, in order, by every tick.
    pub const LIFECYCLE: [EventKind; 6] = [
        EventKind::BeforeUpdate,
        EventKind::Update,
        EventKind::AfterUpdate,
        EventKind::BeforeDraw,
        EventKind::Draw,
        EventKind::AfterDraw,
    ];

    pub fn custom(name: impl Into<String>) -> Self {
        EventKind::Custom(name.into())
    }

    /// Whether the payload of this phase carries the drawing context.
    pub fn is_draw_phase(&self) -> bool {
        matches!(self, EventKind::BeforeDraw | EventKind::Draw | EventKind::AfterDraw)
    }
}

/// Timestamps of the current and previous resolved frame, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    pub time: f64,
    pub previous_time: f64,
}

impl FrameTiming {
    pub fn new(time: f64, previous_time: f64) -> Self {
        Self { time, previous_time }
    }

    /// Milliseconds elapsed since the previous frame.
    pub fn delta(&self) -> f64 {
        self.time - self.previous_time
    }

    /// Frames per second implied by the last delta; zero when no time has passed.
    pub fn fps(&self) -> f64 {
        if self.time == self.previous_time {
            return 0.0;
        }
        1000.0 / self.delta()
    }
}

/// Payload of the draw family (`beforeDraw`, `draw`, `afterDraw`).
#[derive(Debug, Clone)]
pub struct DrawEvent {
    pub timing: FrameTiming,
    pub context: Context,
}

/// Payload of `keyPressed`, `keyDown` and `keyUp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
}

/// Payload of the mouse family. `mouseMove` carries no button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub button: Option<MouseButton>,
    pub position: IVec2,
}

/// Data passed to every handler of an emitted event.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Frame(FrameTiming),
    Draw(DrawEvent),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Custom(Rc<dyn Any>),
}

impl Payload {
    /// Wraps an application-defined value; read it back with [`Payload::custom_ref`].
    pub fn custom<T: Any>(value: T) -> Self {
        Payload::Custom(Rc::new(value))
    }

    /// Frame timing of the tick this payload belongs to, if any.
    pub fn timing(&self) -> Option<FrameTiming> {
        match self {
            Payload::Frame(timing) => Some(*timing),
            Payload::Draw(draw) => Some(draw.timing),
            _ => None,
        }
    }

    pub fn draw(&self) -> Option<&DrawEvent> {
        match self {
            Payload::Draw(draw) => Some(draw),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&KeyEvent> {
        match self {
            Payload::Key(event) => Some(event),
            _ => None,
        }
    }

    pub fn mouse(&self) -> Option<&MouseEvent> {
        match self {
            Payload::Mouse(event) => Some(event),
            _ => None,
        }
    }

    pub fn custom_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Payload::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}
