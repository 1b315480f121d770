//! PCD header handling.
//!
//! The header is kept as the exact text lines it was read from. Only the
//! `POINTS` line is ever rewritten; everything else passes through untouched.

use std::borrow::Cow;

use crate::error::{IoError, IoResult};

/// Keywords that may start a PCD header line. Comment lines start with `#`.
pub const HEADER_KEYWORDS: [&str; 10] = [
    "VERSION",
    "FIELDS",
    "SIZE",
    "TYPE",
    "COUNT",
    "WIDTH",
    "HEIGHT",
    "VIEWPOINT",
    "POINTS",
    "DATA",
];

/// Field count assumed when the header has no `FIELDS` line (x y z intensity).
pub const DEFAULT_FIELD_COUNT: usize = 4;

/// The header of a PCD file, line for line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcdHeader {
    /// Header lines in file order, without line terminators.
    pub lines: Vec<String>,
}

impl PcdHeader {
    /// Wraps existing header lines.
    #[must_use]
    pub const fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Builds a minimal ascii PCD v0.7 header for the given field names.
    ///
    /// Useful when a cloud was produced in memory and has no header of its own.
    ///
    /// # Example
    ///
    /// ```
    /// use facade_io::PcdHeader;
    ///
    /// let header = PcdHeader::for_fields(&["x", "y", "z", "intensity"]);
    /// assert_eq!(header.field_count(), 4);
    /// assert_eq!(header.data_encoding(), Some("ascii"));
    /// ```
    #[must_use]
    pub fn for_fields(names: &[&str]) -> Self {
        let repeat = |token: &str| vec![token; names.len()].join(" ");
        Self::new(vec![
            "# .PCD v0.7 - Point Cloud Data file format".to_string(),
            "VERSION 0.7".to_string(),
            format!("FIELDS {}", names.join(" ")),
            format!("SIZE {}", repeat("4")),
            format!("TYPE {}", repeat("F")),
            format!("COUNT {}", repeat("1")),
            "WIDTH 0".to_string(),
            "HEIGHT 1".to_string(),
            "VIEWPOINT 0 0 0 1 0 0 0".to_string(),
            "POINTS 0".to_string(),
            "DATA ascii".to_string(),
        ])
    }

    /// Whether `line` belongs to a PCD header.
    #[must_use]
    pub fn is_header_line(line: &str) -> bool {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            return true;
        }
        trimmed
            .split_whitespace()
            .next()
            .is_some_and(|token| HEADER_KEYWORDS.contains(&token))
    }

    /// The text after `keyword` on the first line it starts.
    fn value(&self, keyword: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed.strip_prefix(keyword)?;
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                Some(rest.trim())
            } else {
                None
            }
        })
    }

    /// Field names from the `FIELDS` line, if present.
    #[must_use]
    pub fn field_names(&self) -> Option<Vec<&str>> {
        self.value("FIELDS")
            .map(|names| names.split_whitespace().collect())
    }

    /// Number of values per data row.
    ///
    /// Taken from the `FIELDS` line, or [`DEFAULT_FIELD_COUNT`] without one.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_names()
            .map_or(DEFAULT_FIELD_COUNT, |names| names.len())
    }

    /// Point count declared on the `POINTS` line.
    #[must_use]
    pub fn points(&self) -> Option<usize> {
        self.value("POINTS")?.parse().ok()
    }

    /// Encoding declared on the `DATA` line.
    #[must_use]
    pub fn data_encoding(&self) -> Option<&str> {
        self.value("DATA")
    }

    /// Checks the header can describe an ascii body and returns the number
    /// of values expected per row.
    ///
    /// # Errors
    ///
    /// - [`IoError::MissingHeader`] if there are no header lines
    /// - [`IoError::UnsupportedData`] if `DATA` names a non-ascii encoding
    /// - [`IoError::Parse`] if `FIELDS` lists fewer than three names
    pub fn row_width(&self) -> IoResult<usize> {
        if self.lines.is_empty() {
            return Err(IoError::MissingHeader);
        }

        if let Some(encoding) = self.data_encoding() {
            if !encoding.eq_ignore_ascii_case("ascii") {
                return Err(IoError::UnsupportedData {
                    encoding: encoding.to_string(),
                });
            }
        }

        let width = self.field_count();
        if width < 3 {
            let line = self
                .lines
                .iter()
                .position(|l| l.trim_start().starts_with("FIELDS"))
                .map_or(1, |i| i + 1);
            return Err(IoError::parse(
                line,
                format!("FIELDS must name at least x, y and z, found {width}"),
            ));
        }
        Ok(width)
    }

    /// Header lines with the `POINTS` line set to `point_count`.
    ///
    /// Every other line, `WIDTH` included, is returned as is.
    pub fn lines_with_points(&self, point_count: usize) -> impl Iterator<Item = Cow<'_, str>> {
        self.lines.iter().map(move |line| {
            let is_points = line.split_whitespace().next() == Some("POINTS");
            if is_points {
                Cow::Owned(format!("POINTS {point_count}"))
            } else {
                Cow::Borrowed(line.as_str())
            }
        })
    }
}
