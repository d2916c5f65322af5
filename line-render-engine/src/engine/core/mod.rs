//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions,
//! and the runtime opacity settings.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the opacity pipeline, asset loading systems,
/// and platform-specific window configuration.
pub mod app_setup;

/// Application state machine from loading to runtime execution.
pub mod app_state;

/// Opacity parameters, dataset selection and the JSON override file.
pub mod settings;
