//! Asset loading for prepared line sets.

/// Loads the preset's `*.lines.json`, validates it and publishes it to the render world.
pub mod line_set_loader;
