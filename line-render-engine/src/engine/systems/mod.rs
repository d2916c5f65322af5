//! Core runtime systems for parameter control and diagnostics.

/// FPS in the window title and the native parameter overlay.
pub mod fps_tracking;

/// Keyboard controls for the runtime opacity parameters.
pub mod parameter_controls;
