//! A minimal real-time game framework.
//!
//! A [`frame_loop::FrameLoop`] drives one tick per display refresh; each tick
//! folds the application state through the lifecycle events of an
//! [`bus::EventBus`], with edge-triggered keyboard and mouse events injected
//! during `update`. Drawing happens on an in-memory [`surface::PixelCanvas`]
//! that a host (the SDL2 `app` behind the `sdl` feature) presents.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg(feature = "sdl")]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod platform;

pub mod bus;
pub mod constants;
pub mod error;
pub mod events;
pub mod frame_loop;
pub mod game;
pub mod input;
pub mod surface;
