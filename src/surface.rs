//! The drawing surface: an in-memory pixel canvas and the shared context handle
//! that draw-phase handlers paint through.
//!
//! The host is responsible for presenting the canvas (see `app`); the core only
//! ever touches pixels through [`Context`].

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use glam::{IVec2, UVec2, Vec2};

use crate::error::{GameError, GameResult, ParseColorError};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs the color as a native `ARGB8888` pixel.
    pub fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    fn from_hex(digits: &str) -> Result<Self, ParseColorError> {
        let invalid = || ParseColorError::InvalidHex(format!("#{digits}"));
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
        match digits.len() {
            // Shorthand `#rgb`: every nibble is doubled
            3 => {
                let nibble = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, channel(6..8)?)),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(digits) = s.strip_prefix('#') {
            return Color::from_hex(digits);
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "blue" => Ok(Color::BLUE),
            "transparent" => Ok(Color::rgba(0, 0, 0, 0)),
            _ => Err(ParseColorError::UnknownName(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// An axis-aligned rectangle given by its top-left and bottom-right corners.
///
/// Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min: IVec2,
    pub max: IVec2,
}

impl Rect {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Builds a rectangle from a position and a size; the far corner is `position + size`.
    pub fn from_position_size(position: IVec2, size: IVec2) -> Self {
        Self::new(position, position + size)
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.min.x && point.y >= self.min.y && point.x <= self.max.x && point.y <= self.max.y
    }
}

/// Where the canvas is displayed on the host, in client (window) coordinates.
///
/// The ratio between this size and the canvas' intrinsic size is used to
/// rescale pointer positions back into canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub origin: Vec2,
    pub size: Vec2,
}

impl DisplayBounds {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Bounds of a canvas shown 1:1 at the client origin.
    pub fn identity(canvas: UVec2) -> Self {
        Self::new(Vec2::ZERO, canvas.as_vec2())
    }

    /// Largest aspect-preserving box for `canvas` centered inside `window`.
    pub fn letterbox(window: UVec2, canvas: UVec2) -> Self {
        let window = window.as_vec2();
        let canvas = canvas.as_vec2();
        let scale = (window.x / canvas.x).min(window.y / canvas.y);
        let size = canvas * scale;
        Self::new(((window - size) / 2.0).floor(), size.floor())
    }
}

/// A pixel-addressable raster the size of the game canvas.
///
/// Fills are opaque: the fill style replaces whatever is underneath.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    size: UVec2,
    pixels: Vec<Color>,
    fill_style: Color,
}

impl PixelCanvas {
    /// Creates a canvas cleared to black.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Setup` when either dimension is zero.
    pub fn new(size: UVec2) -> GameResult<Self> {
        if size.x == 0 || size.y == 0 {
            return Err(GameError::Setup(format!("canvas size must be non-zero, got {}x{}", size.x, size.y)));
        }

        Ok(Self {
            size,
            pixels: vec![Color::BLACK; (size.x * size.y) as usize],
            fill_style: Color::BLACK,
        })
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn fill_style(&self) -> Color {
        self.fill_style
    }

    pub fn set_fill_style(&mut self, color: Color) {
        self.fill_style = color;
    }

    /// Fills a rectangle with the current fill style, clipped to the canvas.
    ///
    /// Negative sizes extend left/up from the given corner.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.paint(x, y, width, height, self.fill_style);
    }

    /// Resets a rectangle to opaque black.
    pub fn clear_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.paint(x, y, width, height, Color::BLACK);
    }

    /// Fills the whole canvas with `color`.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Writes the canvas into `out` as rows of native `ARGB8888` pixels.
    pub fn write_argb(&self, out: &mut [u8], pitch: usize) {
        let width = self.size.x as usize;
        for (row, chunk) in self.pixels.chunks(width).enumerate() {
            let line = &mut out[row * pitch..row * pitch + width * 4];
            for (dst, color) in line.chunks_exact_mut(4).zip(chunk) {
                dst.copy_from_slice(&color.to_argb().to_ne_bytes());
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.size.x || y as u32 >= self.size.y {
            return None;
        }
        Some(y as usize * self.size.x as usize + x as usize)
    }

    fn paint(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let (x0, x1) = if width < 0 { (x.saturating_add(width), x) } else { (x, x.saturating_add(width)) };
        let (y0, y1) = if height < 0 { (y.saturating_add(height), y) } else { (y, y.saturating_add(height)) };

        let x0 = x0.clamp(0, self.size.x as i32) as usize;
        let x1 = x1.clamp(0, self.size.x as i32) as usize;
        let y0 = y0.clamp(0, self.size.y as i32) as usize;
        let y1 = y1.clamp(0, self.size.y as i32) as usize;

        let stride = self.size.x as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }
}

/// Shared handle to the game canvas, handed to every draw-family handler.
///
/// Cloning is cheap; all clones paint onto the same pixels. Borrows are scoped
/// to a single call, so handlers may hold the handle across nested emits.
#[derive(Debug, Clone)]
pub struct Context {
    canvas: Rc<RefCell<PixelCanvas>>,
}

impl Context {
    pub fn new(canvas: PixelCanvas) -> Self {
        Self {
            canvas: Rc::new(RefCell::new(canvas)),
        }
    }

    pub fn size(&self) -> UVec2 {
        self.canvas.borrow().size()
    }

    pub fn width(&self) -> u32 {
        self.canvas.borrow().width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.borrow().height()
    }

    pub fn fill_style(&self) -> Color {
        self.canvas.borrow().fill_style()
    }

    pub fn set_fill_style(&self, color: Color) {
        self.canvas.borrow_mut().set_fill_style(color);
    }

    pub fn fill_rect(&self, x: i32, y: i32, width: i32, height: i32) {
        self.canvas.borrow_mut().fill_rect(x, y, width, height);
    }

    pub fn clear_rect(&self, x: i32, y: i32, width: i32, height: i32) {
        self.canvas.borrow_mut().clear_rect(x, y, width, height);
    }

    /// Fills the whole canvas with `background`.
    pub fn clear(&self, background: Color) {
        self.canvas.borrow_mut().clear(background);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.canvas.borrow().pixel(x, y)
    }

    /// Read access to the underlying canvas, e.g. for presenting it.
    pub fn canvas(&self) -> Ref<'_, PixelCanvas> {
        self.canvas.borrow()
    }
}
