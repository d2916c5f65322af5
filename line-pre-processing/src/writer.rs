/// Prepared line set JSON output.
use crate::error::GeometryError;
use constants::line_set::PreparedLineSet;
use std::fs;
use std::path::Path;

pub fn write_prepared(set: &PreparedLineSet, path: &Path) -> Result<(), GeometryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string(set)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn read_prepared(path: &Path) -> Result<PreparedLineSet, GeometryError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// `data/tornado.obj` becomes `data/tornado.lines.json`.
pub fn default_output_path(input: &Path) -> std::path::PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "lines".to_string());
    input.with_file_name(format!("{stem}.lines.json"))
}
