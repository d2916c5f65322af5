pub mod camera;
pub mod core;
pub mod loading;
pub mod opacity;
pub mod render;
pub mod systems;
