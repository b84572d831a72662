//! Retained-mode terminal UI engine.
//!
//! A [`component::Tree`] holds the visual hierarchy and routes input through
//! it, [`window::WindowStack`] layers modal windows over each other with a
//! darkened snapshot of the window below, and [`event_loop::EventLoop`]
//! pumps a terminal driver into the stack one frame at a time.

pub mod clipboard;
pub mod colors;
pub mod component;
pub mod components;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod geom;
pub mod keybindings;
pub mod runner;
pub mod state;
pub mod task;
pub mod text;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use config::EngineConfig;
pub use error::{Error, Result};
