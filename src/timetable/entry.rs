use crate::grid::Grid;
use crate::timetable::span::SpanMap;
use crate::timetable::time::TimeFormatter;
use serde::Deserialize;
use serde::Serialize;

/// One scheduled activity in one room at one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub room: String,
    pub day: String,
    /// Date text copied verbatim from the banner
    pub date: String,
    /// Normalized time label, empty when the column has none
    pub time: String,
    /// Cell content with all whitespace removed
    pub activity_code: String,
}

/// Emits one entry per usable activity cell.
///
/// `span_times[i]` holds the time labels for the columns of `spans[i]`, in order.
pub fn build_entries(
    grid: &Grid,
    data_rows: &[usize],
    spans: &SpanMap,
    span_times: &[Vec<String>],
    skip_label: &str,
    formatter: &TimeFormatter,
) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for &row in data_rows {
        let room = grid.get(row, 0).text();
        for (index, (span, labels)) in spans.iter().enumerate() {
            let times = span_times.get(index).map(Vec::as_slice).unwrap_or(&[]);
            for (offset, col) in span.columns().enumerate() {
                if col >= grid.width() {
                    break;
                }
                let value = grid.get(row, col).text();
                if value.is_empty() || value.eq_ignore_ascii_case(skip_label) {
                    continue;
                }
                if formatter.is_time_shaped(&value) {
                    log::trace!("Skip time-shaped value '{value}' at row {row}, column {col}");
                    continue;
                }
                entries.push(ScheduleEntry {
                    room: room.to_string(),
                    day: labels.day.to_owned(),
                    date: labels.date.to_owned(),
                    time: times.get(offset).cloned().unwrap_or_default(),
                    activity_code: value.split_whitespace().collect(),
                });
            }
        }
    }
    entries
}
