//! Point cloud file I/O.
//!
//! Reads and writes ASCII PCD files while keeping the header intact:
//!
//! - [`read_pcd`] / [`load_pcd`] - Parse a header and its data rows
//! - [`write_pcd`] / [`save_pcd`] - Write them back, updating only `POINTS`
//! - [`PcdHeader`] - The header lines plus accessors for the values the
//!   reader needs (`FIELDS`, `POINTS`, `DATA`)
//!
//! Binary and compressed PCD bodies are not supported.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod header;
mod pcd;

pub use error::{IoError, IoResult};
pub use header::{PcdHeader, DEFAULT_FIELD_COUNT, HEADER_KEYWORDS};
pub use pcd::{load_pcd, read_pcd, save_pcd, write_pcd, PcdFile};
