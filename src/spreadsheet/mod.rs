//! # Spreadsheet Input Module
//!
//! Reads one worksheet of an Excel workbook (.xlsx, .xlsm, .xlam) into a
//! rectangular [`Grid`] of cells. Interpretation of the grid lives in
//! [`crate::timetable`]; this module only handles the file container,
//! cell types and sheet/range selection.

pub(crate) mod cell;
pub mod criteria;
pub(crate) mod excel;
pub mod range;
pub(crate) mod reference;
pub mod xlsx;

use crate::error::TimetableError;
use crate::grid::Grid;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

/// Errors raised while locating data inside a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Unsupported or unrecognized file format
    #[error("Cannot detect file format for '{0}'")]
    InvalidFileFormat(String),

    /// Workbook declares no worksheets
    #[error("Workbook '{0}' contains no sheets")]
    EmptyWorkbook(String),

    /// A required part of the archive is absent
    #[error("Missing workbook part '{0}'")]
    MissingPart(String),

    /// No sheet matches the requested names
    #[error("No matching sheet found in '{0}'")]
    SheetNotFound(String),
}

/// A workbook that can produce a grid from one of its sheets
pub trait Spreadsheet {
    /// Name of the workbook, usually its path
    fn name(&self) -> String;

    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the first sheet accepted by `criteria` into a grid anchored at the range origin
    fn read_grid(&mut self, criteria: &Criteria) -> Result<Grid, TimetableError>;
}

/// Opens a spreadsheet, choosing the reader from the file extension
pub fn open_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Box<dyn Spreadsheet>, TimetableError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx" | "xlsm" | "xlam") => Ok(Box::new(XlsxWorkbook::open(path)?)),
        _ => Err(SpreadsheetError::InvalidFileFormat(path.to_string_lossy().to_string()))?,
    }
}

/// Opens a workbook and reads the grid selected by `criteria`
pub fn load_grid<P: AsRef<Path>>(path: P, criteria: &Criteria) -> Result<Grid, TimetableError> {
    let mut spreadsheet = open_spreadsheet(path)?;
    spreadsheet.read_grid(criteria)
}
