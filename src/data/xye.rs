//! Reader for three-column `.xye` text files.
//!
//! Each non-empty line holds `domain value error` separated by whitespace.
//! Lines starting with `#` are comments. Extra columns are ignored.

use crate::data::dataset::Dataset;
use crate::data::suffix::Suffix;
use crate::error::{ModelExpError, Result};
use log::debug;
use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse `.xye` content from any reader
pub fn parse_xye<R: BufRead>(reader: R, suffix: Suffix) -> Result<Dataset> {
    let mut domain = Vec::new();
    let mut values = Vec::new();
    let mut errors = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split_whitespace().collect();
        if columns.len() < 3 {
            return Err(ModelExpError::Parse {
                line: line_no,
                message: format!("expected 3 columns, found {}", columns.len()),
            });
        }

        let parse = |s: &str| {
            s.parse::<f64>().map_err(|e| ModelExpError::Parse {
                line: line_no,
                message: format!("'{}': {}", s, e),
            })
        };
        domain.push(parse(columns[0])?);
        values.push(parse(columns[1])?);
        errors.push(parse(columns[2])?);
    }

    debug!("Parsed {} points for dataset '{}'", domain.len(), suffix);
    Dataset::new(
        Array1::from(domain),
        Array1::from(values),
        Array1::from(errors),
        suffix,
    )
}

/// Load an `.xye` file
pub fn load_xye<P: AsRef<Path>>(path: P, suffix: Suffix) -> Result<Dataset> {
    let path = path.as_ref();
    debug!("Loading {}", path.display());
    let file = File::open(path)?;
    parse_xye(BufReader::new(file), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parse_skips_comments_and_sorts() {
        let text = "# q I sI\n\n0.3 30 3\n  0.1\t10  1 extra\n# mid comment\n0.2 20 2\n";
        let data = parse_xye(text.as_bytes(), Suffix::from("sa")).unwrap();
        assert_eq!(data.domain(), &array![0.1, 0.2, 0.3]);
        assert_eq!(data.values(), &array![10.0, 20.0, 30.0]);
        assert_eq!(data.errors(), &array![1.0, 2.0, 3.0]);
        assert_eq!(data.suffix().label(), "sa");
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_xye("0.1 1 1\n0.2 2\n".as_bytes(), Suffix::default()).unwrap_err();
        match err {
            ModelExpError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("Expected Parse error, got {:?}", other),
        }

        let err = parse_xye("# header\n0.1 abc 1\n".as_bytes(), Suffix::default()).unwrap_err();
        assert!(matches!(err, ModelExpError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_xye("/nonexistent/modelexp_rs.xye", Suffix::default()).unwrap_err();
        assert!(matches!(err, ModelExpError::Io(_)));
    }
}
