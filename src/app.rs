use std::time::{Duration, Instant};

use glam::{UVec2, Vec2};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::rect::Rect as SdlRect;
use sdl2::render::{Canvas, ScaleMode, Texture};
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};
use tracing::{debug, info, trace, warn};

use crate::constants::LOOP_TIME;
use crate::error::{GameError, GameResult};
use crate::game::Game;
use crate::platform;
use crate::surface::DisplayBounds;

/// Desktop host for a [`Game`]: owns the SDL window, translates hardware
/// events into tracker callbacks, delivers display refreshes to the frame loop
/// and presents the canvas.
pub struct App<S> {
    pub game: Game<S>,
    canvas: Canvas<Window>,
    texture: Texture,
    event_pump: EventPump,
    epoch: Instant,
    focused: bool,
    vsync: bool,
    // Keep SDL alive for the app lifetime so subsystems are not shut down
    _sdl_context: Sdl,
}

impl<S: 'static> App<S> {
    /// Initializes SDL, creates a window sized `canvas * scale` and a streaming
    /// texture matching the canvas.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Sdl` if any SDL initialization step fails.
    pub fn new(game: Game<S>) -> GameResult<Self> {
        info!("Initializing SDL2 application");
        let config = game.config().clone();

        let sdl_context = sdl2::init().map_err(|e| GameError::Sdl(e.to_string()))?;
        let video_subsystem = sdl_context.video().map_err(|e| GameError::Sdl(e.to_string()))?;
        let event_pump = sdl_context.event_pump().map_err(|e| GameError::Sdl(e.to_string()))?;

        let width = (config.size.x as f32 * config.scale).round() as u32;
        let height = (config.size.y as f32 * config.scale).round() as u32;
        trace!(width, height, scale = config.scale, "Creating window");
        let window = video_subsystem
            .window(&config.title, width, height)
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| GameError::Sdl(e.to_string()))?;

        let mut builder = window.into_canvas().accelerated();
        if config.vsync {
            builder = builder.present_vsync();
        }
        let canvas = builder.build().map_err(|e| GameError::Sdl(e.to_string()))?;
        debug!(renderer_info = ?canvas.info(), vsync = config.vsync, "Canvas renderer initialized");

        sdl_context.mouse().show_cursor(config.show_system_cursor);

        let texture_creator = canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, config.size.x, config.size.y)
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        texture.set_scale_mode(ScaleMode::Nearest);

        info!("Application initialization completed successfully");
        Ok(Self {
            game,
            canvas,
            texture,
            event_pump,
            epoch: Instant::now(),
            focused: true,
            vsync: config.vsync,
            _sdl_context: sdl_context,
        })
    }

    /// Runs one host iteration: pump hardware events, deliver the pending
    /// refresh (if any), present, and pace the loop.
    ///
    /// # Returns
    ///
    /// `Ok(false)` once the user asked to quit.
    ///
    /// # Errors
    ///
    /// Propagates tick failures and presentation errors.
    pub fn run(&mut self) -> GameResult<bool> {
        let start = Instant::now();

        let events: Vec<Event> = self.event_pump.poll_iter().collect();
        for event in events {
            if !self.handle_event(event) {
                return Ok(false);
            }
        }

        let time = self.epoch.elapsed().as_secs_f64() * 1000.0;
        self.game.refresh(time)?;
        self.present()?;

        let elapsed = start.elapsed();
        if elapsed > LOOP_TIME * 2 {
            warn!(behind = ?(elapsed - LOOP_TIME), "Frame loop behind schedule");
        }

        // Vsync paces presentation on its own; sleep otherwise, or when hidden behind other windows
        if !self.vsync || !self.focused {
            let remaining = LOOP_TIME.saturating_sub(elapsed);
            if remaining != Duration::ZERO {
                platform::sleep(remaining, self.focused);
            }
        }

        Ok(true)
    }

    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => {
                info!("Exit requested. Exiting...");
                return false;
            }
            Event::Window { win_event, .. } => match win_event {
                WindowEvent::FocusLost => {
                    debug!("Window lost focus");
                    self.focused = false;
                    self.game.focus_lost();
                }
                WindowEvent::FocusGained => {
                    debug!("Window gained focus");
                    self.focused = true;
                }
                _ => {}
            },
            Event::KeyDown {
                keycode: Some(keycode), ..
            } => self.game.keyboard().key_down(key_name(keycode)),
            Event::KeyUp {
                keycode: Some(keycode), ..
            } => self.game.keyboard().key_up(key_name(keycode)),
            Event::MouseMotion { x, y, .. } => {
                let (width, height) = self.canvas.window().size();
                let bounds = DisplayBounds::letterbox(UVec2::new(width, height), self.game.config().size);
                self.game.mouse().pointer_move(Vec2::new(x as f32, y as f32), bounds);
            }
            Event::MouseButtonDown { mouse_btn, .. } => self.game.mouse().button_down(button_ordinal(mouse_btn)),
            Event::MouseButtonUp { mouse_btn, .. } => self.game.mouse().button_up(button_ordinal(mouse_btn)),
            _ => {}
        }
        true
    }

    fn present(&mut self) -> GameResult<()> {
        let context = self.game.context().clone();
        self.texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| context.canvas().write_argb(buffer, pitch))
            .map_err(|e| GameError::Sdl(e.to_string()))?;

        let (width, height) = self.canvas.output_size().map_err(|e| GameError::Sdl(e.to_string()))?;
        let bounds = DisplayBounds::letterbox(UVec2::new(width, height), context.size());
        let destination = SdlRect::new(
            bounds.origin.x as i32,
            bounds.origin.y as i32,
            bounds.size.x as u32,
            bounds.size.y as u32,
        );

        self.canvas.set_draw_color(SdlColor::BLACK);
        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, destination)
            .map_err(|e| GameError::Sdl(e.to_string()))?;
        self.canvas.present();
        Ok(())
    }
}

/// Single-character keys are reported lowercase (`"x"`), others by name (`"Left"`).
fn key_name(keycode: Keycode) -> String {
    let name = keycode.name();
    if name.chars().count() == 1 {
        name.to_lowercase()
    } else {
        name
    }
}

/// Hardware ordinal of an SDL button; unknown buttons map outside the tracked range.
fn button_ordinal(button: SdlMouseButton) -> u8 {
    match button {
        SdlMouseButton::Left => 0,
        SdlMouseButton::Middle => 1,
        SdlMouseButton::Right => 2,
        SdlMouseButton::X1 => 3,
        SdlMouseButton::X2 => 4,
        SdlMouseButton::Unknown => u8::MAX,
    }
}
