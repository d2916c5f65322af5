/// Command line conversion from polyline text to a prepared `*.lines.json` asset.
use crate::error::GeometryError;
use crate::obj::{RawLineSet, read_line_set};
use crate::prepare::prepare_line_set_with_progress;
use crate::synthetic;
use crate::writer::{default_output_path, write_prepared};
use constants::line_set::PreparedLineSet;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

pub const DEFAULT_BUDGET: u32 = 10_000;
pub const SYNTHETIC_TORNADO: &str = "--synthetic-tornado";

/// Where the raw polylines come from.
#[derive(Debug, Clone, PartialEq)]
pub enum LineSource {
    File(PathBuf),
    SyntheticTornado { lines: usize, samples: usize },
}

pub struct LineSetConverter {
    source: LineSource,
    budget: u32,
    output_path: PathBuf,
}

impl LineSetConverter {
    /// Builds a converter from `<input | --synthetic-tornado> [budget] [output]`.
    pub fn from_args(args: &[String]) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(input) = args.first() else {
            return Err("missing input path".into());
        };

        let budget = match args.get(1) {
            Some(value) => value
                .parse()
                .map_err(|_| format!("budget must be a positive integer, got '{value}'"))?,
            None => DEFAULT_BUDGET,
        };

        let source = if input == SYNTHETIC_TORNADO {
            LineSource::SyntheticTornado {
                lines: 400,
                samples: 250,
            }
        } else {
            LineSource::File(PathBuf::from(input))
        };

        let output_path = match (args.get(2), &source) {
            (Some(path), _) => PathBuf::from(path),
            (None, LineSource::File(path)) => default_output_path(path),
            (None, LineSource::SyntheticTornado { .. }) => PathBuf::from("tornado.lines.json"),
        };

        Ok(Self {
            source,
            budget,
            output_path,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn convert(&self) -> Result<PreparedLineSet, Box<dyn std::error::Error>> {
        let raw = self.load_source()?;
        println!(
            "Read {} vertices, {} lines ({} records skipped)",
            raw.vertices.len(),
            raw.lines.len(),
            raw.skipped_records
        );

        let pb = ProgressBar::new(2 * raw.lines.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} lines ({percent}%) {msg}")?
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message(format!("Distributing {} control points", self.budget));

        let prepared = prepare_line_set_with_progress(&raw, self.budget, &pb)?;
        pb.finish_with_message("Blend weights computed");

        self.print_summary(&raw, &prepared);

        write_prepared(&prepared, &self.output_path)?;
        println!("Wrote {}", self.output_path.display());

        Ok(prepared)
    }

    fn load_source(&self) -> Result<RawLineSet, GeometryError> {
        match &self.source {
            LineSource::File(path) => {
                println!("Reading polylines from {}...", path.display());
                read_line_set(path)
            }
            LineSource::SyntheticTornado { lines, samples } => {
                println!("Generating {lines} synthetic tornado streamlines...");
                Ok(synthetic::tornado(*lines, *samples))
            }
        }
    }

    fn print_summary(&self, raw: &RawLineSet, prepared: &PreparedLineSet) {
        let dropped = raw.lines.len() - prepared.line_count();
        let (min_length, max_length) = prepared
            .line_lengths
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &length| {
                (min.min(length), max.max(length))
            });
        let floor_lines = prepared
            .control_points_per_line
            .iter()
            .filter(|&&count| count == 2)
            .count();

        println!("Prepared line set:");
        println!("  Lines: {} ({} empty dropped)", prepared.line_count(), dropped);
        println!(
            "  Vertices: {} ({} duplicates removed)",
            prepared.vertex_count(),
            raw.lines.iter().map(Vec::len).sum::<usize>() - prepared.vertex_count()
        );
        println!("  Line length: {:.3} .. {:.3}", min_length, max_length);
        println!(
            "  Control points: {} ({} lines at the floor of 2)",
            prepared.control_point_count(),
            floor_lines
        );
        println!(
            "  Bounds: [{:.2}, {:.2}, {:.2}] - [{:.2}, {:.2}, {:.2}]",
            prepared.bounds_min[0],
            prepared.bounds_min[1],
            prepared.bounds_min[2],
            prepared.bounds_max[0],
            prepared.bounds_max[1],
            prepared.bounds_max[2]
        );
    }
}
