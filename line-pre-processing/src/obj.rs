/// Polyline text reader for `v`, `vt` and `l` records.
use crate::error::GeometryError;
use constants::render_settings::DEFAULT_IMPORTANCE;
use std::fs;
use std::path::Path;

/// Unprocessed polylines as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLineSet {
    pub vertices: Vec<[f32; 3]>,
    /// The k-th `vt` record belongs to the k-th vertex.
    pub importance: Vec<f32>,
    /// 0-based vertex indices per polyline, in file order.
    pub lines: Vec<Vec<u32>>,
    /// Records that were ignored (unknown kind or unparseable numbers).
    pub skipped_records: usize,
}

impl RawLineSet {
    pub fn importance_of(&self, vertex: u32) -> f32 {
        self.importance
            .get(vertex as usize)
            .copied()
            .unwrap_or(DEFAULT_IMPORTANCE)
    }
}

pub fn read_line_set(path: &Path) -> Result<RawLineSet, GeometryError> {
    let text = fs::read_to_string(path)?;
    parse_line_set(&text)
}

pub fn parse_line_set(text: &str) -> Result<RawLineSet, GeometryError> {
    let mut set = RawLineSet::default();

    for (number, record) in text.lines().enumerate() {
        let line_number = number + 1;
        let mut tokens = record.split_whitespace();
        let Some(kind) = tokens.next() else {
            continue;
        };

        match kind {
            "v" => match parse_floats::<3>(tokens) {
                Some(position) => set.vertices.push(position),
                None => set.skipped_records += 1,
            },
            "vt" => match parse_floats::<1>(tokens) {
                Some([weight]) => set.importance.push(weight),
                None => set.skipped_records += 1,
            },
            "l" => {
                let mut indices = Vec::new();
                for token in tokens {
                    let index: i64 = token.parse().map_err(|_| GeometryError::Parse {
                        line: line_number,
                        message: format!("invalid vertex index '{token}'"),
                    })?;
                    if index < 1 || index as usize > set.vertices.len() {
                        return Err(GeometryError::IndexOutOfRange {
                            line: line_number,
                            index,
                            vertex_count: set.vertices.len(),
                        });
                    }
                    indices.push((index - 1) as u32);
                }
                set.lines.push(indices);
            }
            _ if kind.starts_with('#') => {}
            _ => set.skipped_records += 1,
        }
    }

    Ok(set)
}

fn parse_floats<'a, const N: usize>(tokens: impl Iterator<Item = &'a str>) -> Option<[f32; N]> {
    let mut values = [0.0; N];
    let mut tokens = tokens;
    for value in values.iter_mut() {
        *value = tokens.next()?.parse().ok()?;
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_record_kinds() {
        let text = "# comment\nv 0 0 0\nv 1 0 0\nv 2 0 0\nvt 0.25\nvt 0.75\nl 1 2 3\n";
        let set = parse_line_set(text).unwrap();
        assert_eq!(set.vertices.len(), 3);
        assert_eq!(set.lines, vec![vec![0, 1, 2]]);
        assert_eq!(set.importance_of(1), 0.75);
        assert_eq!(set.importance_of(2), DEFAULT_IMPORTANCE);
        assert_eq!(set.skipped_records, 0);
    }

    #[test]
    fn skips_broken_vertices_and_unknown_records() {
        let text = "v 0 0\nv 1 2 3\nvt nope\nvn 0 1 0\nl 1\n";
        let set = parse_line_set(text).unwrap();
        assert_eq!(set.vertices, vec![[1.0, 2.0, 3.0]]);
        assert_eq!(set.skipped_records, 3);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = parse_line_set("v 0 0 0\nl 1 2\n").unwrap_err();
        assert!(matches!(
            err,
            GeometryError::IndexOutOfRange {
                line: 2,
                index: 2,
                vertex_count: 1
            }
        ));
    }
}
