use thiserror::Error;

/// Crate-wide error type.
/// Aggregates input-source failures (I/O, archive, XML, workbook layout) and structural
/// extraction failures, keeping the two distinguishable to callers.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    RangeError(#[from] crate::spreadsheet::range::RangeError),

    // Extraction errors
    #[error("{0}")]
    ExtractError(#[from] crate::timetable::ExtractError),
}

impl TimetableError {
    /// Returns true when the grid loaded but its layout could not be interpreted.
    pub fn is_structural(&self) -> bool {
        matches!(self, TimetableError::ExtractError(_))
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TimetableError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| match e {
            TimetableError::ExtractError(_) => e,
            _ => TimetableError::WithContextError(format!("{}: {}", message, e)),
        })
    }
}
