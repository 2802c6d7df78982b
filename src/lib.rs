//! # rusty_timetable
//!
//! Extracts schedule entries from timetable grids, the kind of sheet where a banner row of
//! `Monday 12/08/24` style labels spans the columns below it, a time row underneath gives each
//! column its slot, and every further row is a room whose cells hold activity codes.
//!
//! ## Pipeline
//!
//! - Banner rows are located with a day/date pattern
//! - Each banner claims the columns up to the next banner on its row
//! - Time labels are read from the row(s) below each banner and normalized to `HH:MM`
//! - Remaining rows with a room name become data rows
//! - Each non-blank activity cell becomes one [`ScheduleEntry`]
//!
//! ## Example
//!
//! ```
//! use rusty_timetable::{extract, ExtractOptions, Grid};
//!
//! let grid = Grid::from_strings([
//!     vec!["", "Monday 12/08/24", "", "Tuesday 13/08/24"],
//!     vec!["", "09:00", "11:00", "09:00"],
//!     vec!["Lab A", "CS101", "", "MA201"],
//! ]);
//! let entries = extract(&grid, &ExtractOptions::default()).unwrap();
//! assert_eq!(entries.len(), 2);
//! assert_eq!(entries[1].day, "Tuesday");
//! ```
//!
//! Workbooks are read through [`spreadsheet::load_grid`], and results written with
//! [`export::to_json`].

pub mod error;
pub mod export;
pub mod grid;
mod helpers;
pub mod spreadsheet;
pub mod timetable;

pub use error::TimetableError;
pub use grid::Cell;
pub use grid::Grid;
pub use spreadsheet::criteria::Criteria;
pub use spreadsheet::range::Range;
pub use spreadsheet::xlsx::XlsxWorkbook;
pub use spreadsheet::Spreadsheet;
pub use timetable::banner::YearDigits;
pub use timetable::entry::ScheduleEntry;
pub use timetable::extract;
pub use timetable::ExtractError;
pub use timetable::ExtractOptions;
