//! Application module.
//!
//! This module contains the window lifecycle, event routing and the per-frame update loop.
//!
//! # Module Structure
//!
//! - [`app_state`]: Contains the [`AppState`] struct which holds the renderer, audio and play state
//! - [`event_handler`]: Contains the [`App`] struct and event handling logic
//! - [`update`]: Contains [`update::PlayState`] and the redraw loop
//!
//! # Event Flow
//!
//! 1. **Input Events**: Window and device events are routed to [`update::PlayState`]
//! 2. **State Updates**: Each redraw advances the session and the overlay
//! 3. **Rendering**: The current state is rendered to the screen
//!
//! Everything runs on the event loop thread. Only audio decoding happens elsewhere.

pub mod app_state;
pub mod event_handler;
pub mod update;

pub use app_state::AppState;
pub use event_handler::App;
