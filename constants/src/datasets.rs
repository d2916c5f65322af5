/// Camera placement and solver weights tuned for one of the bundled streamline sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetPreset {
    pub name: &'static str,
    /// Prepared asset, relative to the renderer's asset folder.
    pub asset_path: &'static str,
    pub eye: [f32; 3],
    pub look_at: [f32; 3],
    pub q: f32,
    pub r: f32,
    pub lambda: f32,
    pub strip_width: f32,
    /// Budget the asset was prepared with.
    pub control_point_budget: u32,
    pub smoothing_iterations: u32,
}

pub const TORNADO: DatasetPreset = DatasetPreset {
    name: "tornado",
    asset_path: "datasets/tornado.lines.json",
    eye: [11.0, 21.0, -25.0],
    look_at: [10.0, 10.0, 10.0],
    q: 60.0,
    r: 500.0,
    lambda: 1.0,
    strip_width: 0.05,
    control_point_budget: 10_000,
    smoothing_iterations: 10,
};

pub const RINGS: DatasetPreset = DatasetPreset {
    name: "rings",
    asset_path: "datasets/rings.lines.json",
    eye: [40.0, 16.0, 12.0],
    look_at: [10.0, 10.0, 10.0],
    q: 80.0,
    r: 40.0,
    lambda: 1.5,
    strip_width: 0.03,
    control_point_budget: 10_000,
    smoothing_iterations: 10,
};

pub const HELI: DatasetPreset = DatasetPreset {
    name: "heli",
    asset_path: "datasets/heli.lines.json",
    eye: [40.0, 4.0, 17.0],
    look_at: [10.0, 10.0, 10.0],
    q: 100.0,
    r: 200.0,
    lambda: 2.0,
    strip_width: 0.03,
    control_point_budget: 10_000,
    smoothing_iterations: 10,
};

pub const DATASETS: [DatasetPreset; 3] = [TORNADO, RINGS, HELI];

/// Preset by command line index, anything unknown falls back to the tornado.
pub fn preset(index: usize) -> &'static DatasetPreset {
    DATASETS.get(index).unwrap_or(&DATASETS[0])
}
