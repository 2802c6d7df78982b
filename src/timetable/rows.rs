use crate::grid::Grid;
use std::collections::BTreeSet;

/// Labels that disqualify a row as a data row when found in its room cell.
#[derive(Clone, Debug)]
pub struct RoomFilter<'a> {
    /// Column header labels such as `ROOM`
    pub header_labels: &'a [String],
    /// Slot marker that also excludes a whole row when used as its room
    pub skip_label: &'a str,
}

impl RoomFilter<'_> {
    pub fn accepts(&self, room: &str) -> bool {
        !room.is_empty()
            && !room.eq_ignore_ascii_case(self.skip_label)
            && !self.header_labels.iter().any(|label| room.eq_ignore_ascii_case(label))
    }
}

/// Rows that are neither banner nor time rows and carry a room plus some content.
pub fn select_data_rows(grid: &Grid, claimed: &BTreeSet<usize>, filter: &RoomFilter) -> Vec<usize> {
    let rows: Vec<usize> = (0..grid.height())
        .filter(|row| !claimed.contains(row))
        .filter(|row| {
            let cells = grid.row(*row);
            let room = cells.first().map(|cell| cell.text()).unwrap_or_default();
            filter.accepts(&room) && cells.iter().skip(1).any(|cell| !cell.is_blank())
        })
        .collect();
    log::debug!("Selected {} data row(s) out of {}", rows.len(), grid.height());
    rows
}
