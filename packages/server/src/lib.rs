//! Overlay backend library.
//!
//! Polls the playback, stats and chat sources, keeps the latest snapshot per
//! channel and pushes updates to display clients over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
