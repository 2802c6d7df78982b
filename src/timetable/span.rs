use crate::grid::Grid;
use crate::timetable::banner::BannerPattern;

/// Inclusive column interval owned by one banner cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpan {
    /// Row of the banner that defined this span
    pub banner_row: usize,
    /// First column (inclusive), the banner's own column
    pub start: usize,
    /// Last column (inclusive)
    pub end: usize,
}

impl ColumnSpan {
    pub fn columns(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Day and date labels taken verbatim from a banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayDate {
    pub day: String,
    pub date: String,
}

/// Ordered span association: banner rows ascending, then start column ascending.
/// Spans from different banner rows stay separate even when their columns overlap.
pub type SpanMap = Vec<(ColumnSpan, DayDate)>;

/// Derives the column spans for every banner row.
///
/// Each banner opens a span that closes one column before the next banner in the
/// same row; the last one runs to the grid's final column.
pub fn map_spans(grid: &Grid, banner_rows: &[usize], pattern: &BannerPattern) -> SpanMap {
    let last_col = grid.width().saturating_sub(1);
    let mut spans = SpanMap::new();
    for &row in banner_rows {
        let mut open: Option<(usize, DayDate)> = None;
        for banner in pattern.banners_in_row(grid, row) {
            if let Some((start, labels)) = open.take() {
                spans.push((ColumnSpan { banner_row: row, start, end: banner.col - 1 }, labels));
            }
            open = Some((banner.col, DayDate { day: banner.day, date: banner.date }));
        }
        if let Some((start, labels)) = open {
            spans.push((ColumnSpan { banner_row: row, start, end: last_col }, labels));
        }
    }
    log::debug!("Mapped {} column span(s) from {} banner row(s)", spans.len(), banner_rows.len());
    spans
}
