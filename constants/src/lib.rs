//! Types and defaults shared by the line pre-processor and the renderer.

/// Bundled dataset presets (camera placement and solver weights).
pub mod datasets;

/// Prepared line set interchange asset and its validation.
pub mod line_set;

/// GPU layout constants and default opacity parameters.
pub mod render_settings;
