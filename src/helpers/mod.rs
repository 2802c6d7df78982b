//! Low-level readers shared by the workbook loaders
pub(crate) mod reader;
pub(crate) mod xml;
pub(crate) mod zip;
