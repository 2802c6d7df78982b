//! # Timetable Extraction
//!
//! Turns a printed-timetable grid into [`ScheduleEntry`] records. The grid has no schema;
//! structure is inferred from layout alone:
//!
//! 1. banner rows holding `"<Day> DD/MM/YY"` cells ([`banner`])
//! 2. the column span each banner governs ([`span`])
//! 3. the time labels in the row(s) under each banner ([`time`])
//! 4. data rows carrying a room and activity codes ([`rows`])
//! 5. one entry per usable activity cell ([`entry`])
//!
//! Extraction is a pure function of the grid and the options.
pub mod banner;
pub mod entry;
pub mod rows;
pub mod span;
pub mod time;

use crate::grid::Grid;
use crate::timetable::banner::classify_rows;
use crate::timetable::banner::BannerPattern;
use crate::timetable::banner::YearDigits;
use crate::timetable::entry::build_entries;
use crate::timetable::entry::ScheduleEntry;
use crate::timetable::rows::select_data_rows;
use crate::timetable::rows::RoomFilter;
use crate::timetable::span::map_spans;
use crate::timetable::time::resolve_times;
use crate::timetable::time::TimeFormatter;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Structural failures: the grid loaded but its layout could not be read.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No schedule structure detected: no cell matches '<day> DD/MM/YY'")]
    NoScheduleStructure,

    #[error("No time row below the day/date banner in row {}", .row + 1)]
    MissingTimeRow { row: usize },
}

/// Caller-supplied layout conventions.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Marks a slot (or a whole room row) as non-schedulable, compared case-insensitively
    pub skip_label: String,
    /// Room cell values that mark header rows, compared case-insensitively
    pub room_header_labels: Vec<String>,
    /// Accepted year width in banner dates
    pub year_digits: YearDigits,
    /// Offsets below each banner row to scan for time labels, tried in order
    pub time_row_offsets: Vec<usize>,
    /// Treat unsuffixed digit runs (`0950`) in data cells as stray time labels
    pub bare_digit_times: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            skip_label: "CHAPEL".to_owned(),
            room_header_labels: vec!["ROOM".to_owned(), "ROOMS".to_owned()],
            year_digits: YearDigits::default(),
            time_row_offsets: vec![1],
            bare_digit_times: false,
        }
    }
}

/// Extracts every schedule entry from the grid.
///
/// Entries come out by data row, then by span (banner rows top to bottom, then left to
/// right), then by column.
pub fn extract(grid: &Grid, options: &ExtractOptions) -> Result<Vec<ScheduleEntry>, ExtractError> {
    let pattern = BannerPattern::new(options.year_digits);
    let formatter = TimeFormatter::new().with_bare_digit_times(options.bare_digit_times);

    let banner_rows = classify_rows(grid, &pattern)?;
    let spans = map_spans(grid, &banner_rows, &pattern);
    let time_rows = time_rows_by_banner(grid, &banner_rows, &options.time_row_offsets)?;

    let mut claimed: BTreeSet<usize> = banner_rows.iter().copied().collect();
    claimed.extend(time_rows.values().flatten().copied());

    let filter = RoomFilter {
        header_labels: &options.room_header_labels,
        skip_label: &options.skip_label,
    };
    let data_rows = select_data_rows(grid, &claimed, &filter);

    let lookup_order = time_row_lookup_order(&time_rows);
    let span_times: Vec<Vec<String>> = spans
        .iter()
        .map(|(span, _)| {
            let order = lookup_order.get(&span.banner_row).map(Vec::as_slice).unwrap_or(&[]);
            let columns = span.columns().take_while(|col| *col < grid.width());
            resolve_times(grid, order, columns, &formatter)
        })
        .collect();

    let entries = build_entries(grid, &data_rows, &spans, &span_times, &options.skip_label, &formatter);
    log::debug!("Extracted {} schedule entries", entries.len());
    Ok(entries)
}

/// Per banner row: its own time rows first, then every other time row ascending.
fn time_row_lookup_order(time_rows: &BTreeMap<usize, Vec<usize>>) -> BTreeMap<usize, Vec<usize>> {
    let all_time_rows: BTreeSet<usize> = time_rows.values().flatten().copied().collect();
    time_rows
        .iter()
        .map(|(&banner_row, own)| {
            let own_set: BTreeSet<usize> = own.iter().copied().collect();
            let mut order = own.clone();
            order.extend(all_time_rows.difference(&own_set));
            (banner_row, order)
        })
        .collect()
}

/// Time rows for each banner row, in offset order. Banner rows never double as time rows.
fn time_rows_by_banner(
    grid: &Grid,
    banner_rows: &[usize],
    offsets: &[usize],
) -> Result<BTreeMap<usize, Vec<usize>>, ExtractError> {
    let banners: BTreeSet<usize> = banner_rows.iter().copied().collect();
    banner_rows
        .iter()
        .map(|&row| {
            let candidates: Vec<usize> = offsets
                .iter()
                .filter_map(|offset| row.checked_add(*offset))
                .filter(|candidate| *candidate < grid.height())
                .collect();
            if candidates.is_empty() {
                return Err(ExtractError::MissingTimeRow { row });
            }
            let rows = candidates
                .into_iter()
                .filter(|candidate| !banners.contains(candidate))
                .fold(Vec::new(), |mut rows, candidate| {
                    if !rows.contains(&candidate) {
                        rows.push(candidate);
                    }
                    rows
                });
            Ok((row, rows))
        })
        .collect()
}
