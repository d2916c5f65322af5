//! Viewport camera system for line set navigation.
//!
//! Provides orbit camera controls with smooth interpolation and
//! keyboard/mouse input handling.

/// Viewport camera resource and controller system.
pub mod viewport_camera;
