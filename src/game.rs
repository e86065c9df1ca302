//! The game orchestrator: owns the canvas, the application state, the event
//! bus, the input trackers and the frame loop, and wires the per-tick lifecycle.

use glam::UVec2;
use tracing::{debug, info, trace_span};

use crate::bus::{EventBus, Handler, HandlerResult};
use crate::constants::{DEFAULT_BACKGROUND, DEFAULT_CANVAS_SIZE, DEFAULT_SCALE, DEFAULT_TITLE};
use crate::error::{GameError, GameResult};
use crate::events::{DrawEvent, EventKind, Payload};
use crate::frame_loop::{FrameLoop, FrameRequest};
use crate::input::{Keyboard, Mouse};
use crate::surface::{Color, Context, PixelCanvas};

/// Construction options for a [`Game`].
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Intrinsic canvas size in pixels.
    pub size: UVec2,
    /// Color the canvas is filled with before every draw phase.
    pub background: Color,
    /// Whether the host should keep showing its own cursor over the canvas.
    pub show_system_cursor: bool,
    pub title: String,
    /// Window zoom applied by the host.
    pub scale: f32,
    /// Let the host pace frames with vertical sync rather than sleeping.
    pub vsync: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CANVAS_SIZE,
            background: DEFAULT_BACKGROUND,
            show_system_cursor: true,
            title: DEFAULT_TITLE.to_string(),
            scale: DEFAULT_SCALE,
            vsync: true,
        }
    }
}

impl GameConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: UVec2::new(width, height),
            ..Self::default()
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_system_cursor(mut self, show: bool) -> Self {
        self.show_system_cursor = show;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    fn validate(&self) -> GameResult<()> {
        if self.size.x == 0 || self.size.y == 0 {
            return Err(GameError::Setup(format!(
                "canvas size must be non-zero, got {}x{}",
                self.size.x, self.size.y
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(GameError::Setup(format!("window scale must be positive, got {}", self.scale)));
        }
        Ok(())
    }
}

/// A running game: application state threaded through lifecycle events once
/// per display refresh.
///
/// Each tick emits `tick`, whose built-in handler emits `beforeUpdate`,
/// `update`, `afterUpdate`, `beforeDraw`, `draw` and `afterDraw` in that order.
/// The input trackers are registered on `update`/`afterUpdate` before any
/// application handler, and the canvas is cleared to the background color on
/// `beforeDraw`.
pub struct Game<S> {
    config: GameConfig,
    context: Context,
    bus: EventBus<S>,
    keyboard: Keyboard,
    mouse: Mouse,
    frame_loop: FrameLoop,
    /// `None` only after a handler failure consumed the state.
    state: Option<S>,
    started: bool,
}

impl<S: 'static> Game<S> {
    /// Creates the canvas and wires the bus, the input trackers and the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Setup` for an empty canvas or a non-positive scale.
    pub fn new(config: GameConfig, initial_state: S) -> GameResult<Self> {
        info!(width = config.size.x, height = config.size.y, "Initializing game");
        config.validate()?;

        let context = Context::new(PixelCanvas::new(config.size)?);
        let mut bus = EventBus::new();

        debug!("Registering lifecycle handlers");
        Self::register_lifecycle(&mut bus, context.clone());

        debug!("Attaching input trackers");
        let keyboard = Keyboard::new();
        keyboard.attach(&mut bus);
        let mouse = Mouse::new(config.size);
        mouse.attach(&mut bus);

        let background = config.background;
        bus.on(EventKind::BeforeDraw, move |state, payload, _| {
            if let Some(draw) = payload.draw() {
                draw.context.clear(background);
            }
            Ok(state)
        });

        Ok(Self {
            config,
            context,
            bus,
            keyboard,
            mouse,
            frame_loop: FrameLoop::new(),
            state: Some(initial_state),
            started: false,
        })
    }

    fn register_lifecycle(bus: &mut EventBus<S>, context: Context) {
        bus.on(EventKind::Tick, move |state, payload, bus| {
            let timing = payload.timing().unwrap_or_default();
            let frame = Payload::Frame(timing);
            let draw = Payload::Draw(DrawEvent {
                timing,
                context: context.clone(),
            });

            let state = EventKind::LIFECYCLE.into_iter().try_fold(state, |state, kind| {
                let payload = if kind.is_draw_phase() { &draw } else { &frame };
                bus.emit(kind, state, payload)
            })?;
            Ok(state)
        });
    }

    /// Registers an application handler; shorthand for `game.bus().on(..)`.
    pub fn on<F>(&mut self, kind: EventKind, func: F) -> Handler<S>
    where
        F: Fn(S, &Payload, &mut EventBus<S>) -> HandlerResult<S> + 'static,
    {
        self.bus.on(kind, func)
    }

    pub fn bus(&mut self) -> &mut EventBus<S> {
        &mut self.bus
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// The current application state; `None` once a handler failure consumed it.
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Emits `start` (first call only), then starts the frame loop.
    ///
    /// # Errors
    ///
    /// Propagates a failing `start` handler; the loop is not started then.
    pub fn start(&mut self) -> GameResult<()> {
        if !self.started {
            info!("Starting game");
            self.started = true;
            self.emit(EventKind::Start, &Payload::Empty)?;
        }
        self.frame_loop.start();
        Ok(())
    }

    pub fn stop(&self) {
        self.frame_loop.stop();
    }

    /// Focus loss: every tracked key and button is forgotten.
    pub fn focus_lost(&self) {
        self.keyboard.reset();
        self.mouse.reset();
    }

    /// Emits `kind` against the current state from outside any handler.
    ///
    /// # Errors
    ///
    /// Returns the handler failure, after which the state is gone, or
    /// `GameError::InvalidState` if it was already gone.
    pub fn emit(&mut self, kind: EventKind, payload: &Payload) -> GameResult<()> {
        let state = self.take_state()?;
        self.state = Some(self.bus.emit(kind, state, payload)?);
        Ok(())
    }

    /// Delivers the display refresh `request` at `time` milliseconds to the
    /// frame loop, running one tick if it is the armed request.
    ///
    /// # Errors
    ///
    /// Propagates tick failures; the loop is stopped when that happens.
    pub fn on_refresh(&mut self, request: FrameRequest, time: f64) -> GameResult<bool> {
        let frame_loop = self.frame_loop.clone();
        frame_loop.resolve(request, time, |timing| {
            let _span = trace_span!("tick", time = timing.time).entered();
            let state = self.take_state()?;
            self.state = Some(self.bus.emit(EventKind::Tick, state, &Payload::Frame(timing))?);
            Ok(())
        })
    }

    /// Fires whatever refresh is pending at `time`. Returns whether a tick ran.
    ///
    /// # Errors
    ///
    /// See [`Game::on_refresh`].
    pub fn refresh(&mut self, time: f64) -> GameResult<bool> {
        match self.frame_loop.pending_frame() {
            Some(request) => self.on_refresh(request, time),
            None => Ok(false),
        }
    }

    fn take_state(&mut self) -> GameResult<S> {
        self.state
            .take()
            .ok_or_else(|| GameError::InvalidState("application state was lost to an earlier handler failure".to_string()))
    }
}
