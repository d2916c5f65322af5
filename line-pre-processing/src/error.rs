use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Failed to read line set: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode prepared line set: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: vertex index {index} is outside 1..={vertex_count}")]
    IndexOutOfRange {
        line: usize,
        index: i64,
        vertex_count: usize,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("control point budget {budget} cannot give {lines} lines two points each")]
    InsufficientBudget { budget: u32, lines: usize },
    #[error("line set contains no lines with vertices")]
    Empty,
}
