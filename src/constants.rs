//! This module contains all the constants used by the framework.

use std::time::Duration;

use glam::UVec2;

use crate::surface::Color;

/// Frame budget used to pace the host loop when vertical sync is unavailable.
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The default intrinsic size of the canvas, in pixels.
pub const DEFAULT_CANVAS_SIZE: UVec2 = UVec2::new(128, 72);

/// The default window zoom applied to the canvas on desktop.
pub const DEFAULT_SCALE: f32 = 8.0;

/// The default color the canvas is cleared to before every draw phase.
pub const DEFAULT_BACKGROUND: Color = Color::BLACK;

/// The default window title.
pub const DEFAULT_TITLE: &str = "heks";

/// Number of frame deltas kept for rolling frame statistics.
pub const STATS_WINDOW: usize = 120;
