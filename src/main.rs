#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Pencil & paper: a tiny drawing toy built on the framework.
//!
//! Move the mouse over the paper to aim the pencil, click to leave a dot,
//! hold `p` to cycle through random pencil colors.

use std::collections::HashMap;

use anyhow::Context as _;
use glam::{IVec2, UVec2};
use heks::app::App;
use heks::events::EventKind;
use heks::game::{Game, GameConfig};
use heks::platform;
use heks::surface::{Color, Rect};
use rand::Rng;
use tracing::info;

const GAME_SIZE: UVec2 = UVec2::new(128, 72);
const PAPER_SIZE: IVec2 = IVec2::new(64, 64);
const PAPER_POSITION: IVec2 = IVec2::new(
    (GAME_SIZE.x as i32 - PAPER_SIZE.x) / 2,
    (GAME_SIZE.y as i32 - PAPER_SIZE.y) / 2,
);

#[derive(Debug, Clone)]
struct PencilState {
    mouse_position: IVec2,
    pencil_color: Color,
    drawing: HashMap<IVec2, Color>,
}

fn is_pencil_on_paper(position: IVec2) -> bool {
    Rect::from_position_size(PAPER_POSITION, PAPER_SIZE).contains(position)
}

fn random_color() -> Color {
    let mut rng = platform::rng();
    Color::rgb(rng.random(), rng.random(), rng.random())
}

fn build_game() -> anyhow::Result<Game<PencilState>> {
    let initial = PencilState {
        mouse_position: IVec2::ZERO,
        pencil_color: Color::RED,
        drawing: HashMap::new(),
    };
    let config = GameConfig::new(GAME_SIZE.x, GAME_SIZE.y)
        .with_title("heks: pencil & paper")
        .with_background(Color::BLACK)
        .with_system_cursor(false);
    let mut game = Game::new(config, initial)?;

    game.on(EventKind::MouseMove, |state, payload, _| {
        let Some(event) = payload.mouse() else { return Ok(state) };
        Ok(PencilState {
            mouse_position: event.position,
            ..state
        })
    });

    // Current pencil swatch
    game.on(EventKind::Draw, |state, payload, _| {
        if let Some(draw) = payload.draw() {
            draw.context.set_fill_style(state.pencil_color);
            draw.context.fill_rect(16, 32, 7, 16);
        }
        Ok(state)
    });

    game.on(EventKind::Draw, |state, payload, _| {
        let Some(draw) = payload.draw() else { return Ok(state) };
        draw.context.set_fill_style(Color::WHITE);
        draw.context.fill_rect(PAPER_POSITION.x, PAPER_POSITION.y, PAPER_SIZE.x, PAPER_SIZE.y);
        for (position, color) in &state.drawing {
            draw.context.set_fill_style(*color);
            draw.context.fill_rect(position.x, position.y, 1, 1);
        }
        Ok(state)
    });

    // Pencil tip
    game.on(EventKind::Draw, |state, payload, _| {
        if let (Some(draw), true) = (payload.draw(), is_pencil_on_paper(state.mouse_position)) {
            draw.context.set_fill_style(state.pencil_color);
            draw.context.fill_rect(state.mouse_position.x, state.mouse_position.y, 1, 1);
        }
        Ok(state)
    });

    game.on(EventKind::MousePressed, |mut state, _, _| {
        if is_pencil_on_paper(state.mouse_position) {
            state.drawing.insert(state.mouse_position, state.pencil_color);
        }
        Ok(state)
    });

    game.on(EventKind::KeyDown, |state, payload, _| {
        match payload.key() {
            Some(event) if event.key == "p" => Ok(PencilState {
                pencil_color: random_color(),
                ..state
            }),
            _ => Ok(state),
        }
    });

    Ok(game)
}

fn main() -> anyhow::Result<()> {
    platform::init_logging().context("Could not initialize logging")?;

    let game = build_game().context("Could not create game")?;
    let mut app = App::new(game).context("Could not create app")?;

    app.game.start()?;
    info!("Starting frame loop");
    while app.run()? {}

    info!(frames = app.game.frame_loop().frames(), "Exited");
    Ok(())
}
