use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::borrow::Cow;

/// A single grid value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    /// Plain text, stored as read from the source
    Text(String),
    /// Numeric value without a date/time style
    Number(f64),
    /// Date/time value; time-only values sit on the spreadsheet epoch day
    Temporal(NaiveDateTime),
}

impl Cell {
    /// Epoch day used for time-only temporal values (Excel day zero).
    pub fn epoch_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(1899, 12, 30).expect("NaiveDate Literal")
    }

    /// Returns true if the cell is empty or holds only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed string form of the cell.
    ///
    /// Numbers print in their shortest form (`950.0` becomes `"950"`), temporal values
    /// print as `HH:MM` when they carry no date and as `YYYY-MM-DD HH:MM:SS` otherwise.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(text) => Cow::Borrowed(text.trim()),
            Cell::Number(number) => Cow::Owned(number.to_string()),
            Cell::Temporal(datetime) if datetime.date() == Self::epoch_day() => {
                Cow::Owned(datetime.format("%H:%M").to_string())
            }
            Cell::Temporal(datetime) => Cow::Owned(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_owned())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::Temporal(value)
    }
}

/// Read-only rectangular grid of cells, addressed by 0-based (row, col).
///
/// Ragged input rows are padded with [`Cell::Empty`] up to the widest row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// Builds a grid from rows of cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Cell>,
    {
        let mut rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Grid { rows, width }
    }

    /// Builds a grid from string literals, treating `""` as empty.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = S>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(|value| Cell::from(value.as_ref())).collect::<Vec<_>>()),
        )
    }

    /// Builds a grid from sparse `((row, col), cell)` pairs.
    /// The grid spans from (0, 0) to the largest position given.
    pub fn from_sparse<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = ((usize, usize), Cell)>,
    {
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for ((row, col), cell) in cells {
            if rows.len() <= row {
                rows.resize_with(row + 1, Vec::new);
            }
            let record = &mut rows[row];
            if record.len() <= col {
                record.resize(col + 1, Cell::Empty);
            }
            record[col] = cell;
        }
        Self::from_rows(rows)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (width of the widest source row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at (row, col); positions outside the grid read as empty.
    pub fn get(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|record| record.get(col))
            .unwrap_or(EMPTY)
    }

    /// Cells of a single row, empty slice when out of range.
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}
