//! Falling-note rhythm game core: entities built from capability units, the
//! piano and drum key layouts, and the per-tick game loop.

pub mod app;
pub mod config;
pub mod core;
pub mod game;
pub mod ui;
