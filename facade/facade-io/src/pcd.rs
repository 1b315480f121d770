//! ASCII PCD reading and writing.
//!
//! # Example
//!
//! ```no_run
//! use facade_io::{load_pcd, save_pcd};
//!
//! let file = load_pcd("scan.pcd").unwrap();
//! println!("{} points", file.cloud.len());
//! save_pcd("copy.pcd", &file.header, &file.cloud).unwrap();
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use facade_types::{CloudPoint, PointCloud};
use tracing::{debug, info, warn};

use crate::error::{IoError, IoResult};
use crate::header::PcdHeader;

/// A PCD file: its header lines and its points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PcdFile {
    /// Header, kept verbatim.
    pub header: PcdHeader,
    /// Data rows, in file order.
    pub cloud: PointCloud,
}

impl PcdFile {
    /// Loads a PCD file from disk. See [`load_pcd`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        load_pcd(path)
    }

    /// Saves to disk, writing the current point count into the header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        save_pcd(path, &self.header, &self.cloud)
    }
}

/// Reads an ASCII PCD document.
///
/// The header is the leading run of keyword and comment lines. Every
/// following non-blank line is a data row with exactly as many numbers as
/// the `FIELDS` line names (four when there is no `FIELDS` line).
///
/// # Errors
///
/// - [`IoError::MissingHeader`] if the first line is not a header line
/// - [`IoError::UnsupportedData`] for binary bodies
/// - [`IoError::Parse`] for a row with the wrong field count or a token
///   that is not a number
/// - [`IoError::Io`] if reading fails
///
/// # Example
///
/// ```
/// use facade_io::read_pcd;
///
/// let text = "FIELDS x y z intensity\nPOINTS 1\nDATA ascii\n1 2 3 106\n";
/// let file = read_pcd(text.as_bytes()).unwrap();
/// assert_eq!(file.cloud.len(), 1);
/// assert_eq!(file.cloud.points[0].attributes, vec![106.0]);
/// ```
pub fn read_pcd<R: BufRead>(reader: R) -> IoResult<PcdFile> {
    let mut header_lines = Vec::new();
    let mut body: Option<(PcdHeader, usize)> = None;
    let mut cloud = PointCloud::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        let width = match &body {
            Some((_, width)) => *width,
            None if PcdHeader::is_header_line(&line) => {
                header_lines.push(line);
                continue;
            }
            None => {
                let header = PcdHeader::new(std::mem::take(&mut header_lines));
                let width = header.row_width()?;
                body = Some((header, width));
                width
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        cloud.push(parse_row(trimmed, width, line_number)?);
    }

    let header = match body {
        Some((header, _)) => header,
        None => {
            // Header only, no rows.
            let header = PcdHeader::new(header_lines);
            header.row_width()?;
            header
        }
    };

    if let Some(declared) = header.points() {
        if declared != cloud.len() {
            warn!(
                declared,
                read = cloud.len(),
                "POINTS line disagrees with the number of rows"
            );
        }
    }

    Ok(PcdFile { header, cloud })
}

fn parse_row(line: &str, width: usize, line_number: usize) -> IoResult<CloudPoint> {
    let values = line
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<f64>().map_err(|_| {
                IoError::parse(
                    line_number,
                    format!("field {} is not a number: {token:?}", i + 1),
                )
            })
        })
        .collect::<IoResult<Vec<f64>>>()?;

    if values.len() != width {
        return Err(IoError::parse(
            line_number,
            format!("expected {width} fields, found {}", values.len()),
        ));
    }

    CloudPoint::from_fields(&values)
        .ok_or_else(|| IoError::parse(line_number, "a point needs at least x, y and z"))
}

/// Loads a PCD file from disk.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist. Any other
/// failure, including those from [`read_pcd`], is wrapped in
/// [`IoError::InFile`] with the path.
pub fn load_pcd<P: AsRef<Path>>(path: P) -> IoResult<PcdFile> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let in_file = |error: IoError| IoError::in_file(path, error);
    let file = File::open(path).map_err(|e| in_file(e.into()))?;
    let pcd = read_pcd(BufReader::new(file)).map_err(in_file)?;
    info!(
        path = %path.display(),
        points = pcd.cloud.len(),
        "Loaded point cloud"
    );
    Ok(pcd)
}

/// Writes a PCD document.
///
/// Header lines are written as given except for the `POINTS` line, which
/// becomes `POINTS <cloud.len()>`. Each point is one line of space-separated
/// values: x, y, z, then its attributes. Values use the shortest decimal form
/// that reads back to the same `f64`.
///
/// # Errors
///
/// Returns [`IoError::Io`] if writing fails.
///
/// # Example
///
/// ```
/// use facade_io::{write_pcd, PcdHeader};
/// use facade_types::{CloudPoint, PointCloud};
///
/// let header = PcdHeader::new(vec!["FIELDS x y z".into(), "POINTS 99".into()]);
/// let cloud: PointCloud = vec![CloudPoint::from_coords(1.5, 0.0, -2.0)].into_iter().collect();
///
/// let mut out = Vec::new();
/// write_pcd(&mut out, &header, &cloud).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "FIELDS x y z\nPOINTS 1\n1.5 0 -2\n");
/// ```
pub fn write_pcd<W: Write>(writer: W, header: &PcdHeader, cloud: &PointCloud) -> IoResult<()> {
    let mut writer = BufWriter::new(writer);

    for line in header.lines_with_points(cloud.len()) {
        writeln!(writer, "{line}")?;
    }

    for point in cloud {
        let mut fields = point.fields();
        if let Some(first) = fields.next() {
            write!(writer, "{first}")?;
        }
        for value in fields {
            write!(writer, " {value}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Saves a PCD file to disk. See [`write_pcd`].
///
/// # Errors
///
/// Returns [`IoError::InFile`] with the path if the file cannot be created
/// or written.
pub fn save_pcd<P: AsRef<Path>>(path: P, header: &PcdHeader, cloud: &PointCloud) -> IoResult<()> {
    let path = path.as_ref();
    let in_file = |error: IoError| IoError::in_file(path, error);
    let file = File::create(path).map_err(|e| in_file(e.into()))?;
    write_pcd(file, header, cloud).map_err(in_file)?;
    debug!(path = %path.display(), points = cloud.len(), "Saved point cloud");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use facade_types::Point3;
    use tempfile::tempdir;

    const SCAN: &str = "\
# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z intensity
SIZE 4 4 4 4
TYPE F F F F
COUNT 1 1 1 1
WIDTH 1025349
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 1025349
DATA ascii
474203.83 4423050.11 10.84 106
474203.88 4423050.09 -1.82 0
474204.04 4423050.12 6.94 53
";

    #[test]
    fn reads_header_and_rows() {
        let file = read_pcd(SCAN.as_bytes()).unwrap();
        assert_eq!(file.header.lines.len(), 11);
        assert_eq!(file.header.lines[6], "WIDTH 1025349");
        assert_eq!(file.cloud.len(), 3);

        let first = &file.cloud.points[0];
        assert_relative_eq!(first.position.x, 474_203.83);
        assert_relative_eq!(first.position.y, 4_423_050.11);
        assert_relative_eq!(first.position.z, 10.84);
        assert_eq!(first.attributes, vec![106.0]);
    }

    #[test]
    fn roundtrip_rewrites_points_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.pcd");

        let original = read_pcd(SCAN.as_bytes()).unwrap();
        save_pcd(&path, &original.header, &original.cloud).unwrap();
        let loaded = load_pcd(&path).unwrap();

        assert_eq!(loaded.cloud, original.cloud);
        assert_eq!(loaded.header.points(), Some(3));
        assert!(loaded.header.lines.contains(&"POINTS 3".to_string()));
        // WIDTH is passed through untouched.
        assert!(loaded.header.lines.contains(&"WIDTH 1025349".to_string()));
        assert_eq!(loaded.header.lines.len(), original.header.lines.len());
    }

    #[test]
    fn roundtrip_preserves_exact_values() {
        let cloud: PointCloud = [0.1 + 0.2, 1e-300, -123_456.789_012_345, 6.022e23]
            .iter()
            .map(|&v| CloudPoint::with_attributes(Point3::new(v, -v, v / 3.0), vec![v * 7.0]))
            .collect();
        let header = PcdHeader::for_fields(&["x", "y", "z", "intensity"]);

        let mut bytes = Vec::new();
        write_pcd(&mut bytes, &header, &cloud).unwrap();
        let back = read_pcd(bytes.as_slice()).unwrap();

        assert_eq!(back.cloud, cloud);
    }

    #[test]
    fn extra_fields_become_attributes() {
        let text = "FIELDS x y z intensity ring\nDATA ascii\n1 2 3 4 5\n";
        let file = read_pcd(text.as_bytes()).unwrap();
        assert_eq!(file.cloud.points[0].attributes, vec![4.0, 5.0]);
    }

    #[test]
    fn wrong_field_count_reports_line() {
        let text = "FIELDS x y z intensity\nDATA ascii\n1 2 3 4\n1 2 3\n";
        let err = read_pcd(text.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 4, .. }));
        assert!(err.to_string().contains("expected 4 fields, found 3"));
    }

    #[test]
    fn non_numeric_token_reports_line() {
        let text = "FIELDS x y z intensity\nDATA ascii\n1 2 3 4\n\n1 two 3 4\n";
        let err = read_pcd(text.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::Parse { line: 5, .. }));
        assert!(err.to_string().contains("\"two\""));
    }

    #[test]
    fn blank_lines_skipped() {
        let text = "DATA ascii\n\n1 2 3 4\n   \n5 6 7 8\n";
        let file = read_pcd(text.as_bytes()).unwrap();
        assert_eq!(file.cloud.len(), 2);
    }

    #[test]
    fn header_only_file_is_empty_cloud() {
        let header = PcdHeader::for_fields(&["x", "y", "z"]);
        let mut bytes = Vec::new();
        write_pcd(&mut bytes, &header, &PointCloud::new()).unwrap();

        let file = read_pcd(bytes.as_slice()).unwrap();
        assert!(file.cloud.is_empty());
        assert_eq!(file.header, header);
    }

    #[test]
    fn binary_body_rejected() {
        let text = "FIELDS x y z\nDATA binary\n\u{1}\u{2}\u{3}\n";
        assert!(matches!(
            read_pcd(text.as_bytes()),
            Err(IoError::UnsupportedData { .. })
        ));
    }

    #[test]
    fn rows_without_header_rejected() {
        let text = "1 2 3 4\n5 6 7 8\n";
        assert!(matches!(
            read_pcd(text.as_bytes()),
            Err(IoError::MissingHeader)
        ));
        assert!(matches!(read_pcd("".as_bytes()), Err(IoError::MissingHeader)));
    }

    #[test]
    fn missing_file() {
        let result = load_pcd("/nonexistent/path/scan.pcd");
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn bad_row_on_disk_names_file_and_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.pcd");
        std::fs::write(&path, "FIELDS x y z intensity\nDATA ascii\n1 2 3 4\n1 two 3 4\n").unwrap();

        let err = load_pcd(&path).unwrap_err();
        assert!(matches!(
            &err,
            IoError::InFile { error, .. } if matches!(**error, IoError::Parse { line: 4, .. })
        ));
        let message = err.to_string();
        assert!(message.contains(&path.display().to_string()));
        assert!(message.contains("line 4"));
    }

    #[test]
    fn unwritable_output_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodir").join("out.pcd");

        let err = save_pcd(&path, &PcdHeader::for_fields(&["x", "y", "z"]), &PointCloud::new())
            .unwrap_err();
        assert!(matches!(
            &err,
            IoError::InFile { error, .. } if matches!(**error, IoError::Io(_))
        ));
        assert!(err.to_string().contains(&path.display().to_string()));
        assert!(!path.exists());
    }

    #[test]
    fn pcd_file_load_and_save() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.pcd");
        let output = dir.path().join("out.pcd");

        let mut f = File::create(&input).unwrap();
        f.write_all(SCAN.as_bytes()).unwrap();
        drop(f);

        let mut pcd = PcdFile::load(&input).unwrap();
        pcd.cloud.points.truncate(1);
        pcd.save(&output).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("POINTS 1\n"));
        assert!(text.ends_with("474203.83 4423050.11 10.84 106\n"));
    }
}
