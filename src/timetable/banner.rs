//! Detection of "day + date" banner cells and the rows that carry them.
use crate::grid::Cell;
use crate::grid::Grid;
use crate::timetable::ExtractError;
use regex::Regex;

/// Year widths accepted in a banner's date token.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum YearDigits {
    /// `DD/MM/YY`
    Two,
    /// `DD/MM/YYYY`
    Four,
    /// Either of the above
    #[default]
    Either,
}

impl YearDigits {
    /// Parses `two`, `four` or `either` (case-insensitive, digits accepted).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "two" | "2" => Some(Self::Two),
            "four" | "4" => Some(Self::Four),
            "either" | "any" => Some(Self::Either),
            _ => None,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Two => r"\d{2}",
            Self::Four => r"\d{4}",
            Self::Either => r"(?:\d{2}|\d{4})",
        }
    }
}

/// One banner cell of a row: its column and the parsed day and date tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerMatch {
    pub col: usize,
    pub day: String,
    pub date: String,
}

/// Compiled `<letters> <DD/MM/YY[YY]>` predicate.
#[derive(Clone, Debug)]
pub struct BannerPattern {
    regex: Regex,
}

impl BannerPattern {
    pub fn new(year_digits: YearDigits) -> Self {
        let pattern = format!(r"^(?i)[a-z]+\s+\d{{2}}/\d{{2}}/{}$", year_digits.pattern());
        BannerPattern {
            regex: Regex::new(&pattern).expect("Hardcode regex pattern"),
        }
    }

    /// Returns true if the trimmed text fully matches the banner shape.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text.trim())
    }

    /// Splits a banner on its first whitespace run into (day, date).
    /// Returns None if the text is not banner-shaped.
    pub fn parse(&self, text: &str) -> Option<(String, String)> {
        let text = text.trim();
        if !self.matches(text) {
            return None;
        }
        let (day, date) = text.split_once(char::is_whitespace)?;
        Some((day.to_owned(), date.trim_start().to_owned()))
    }

    /// All banner cells of one row, left to right.
    pub fn banners_in_row(&self, grid: &Grid, row: usize) -> Vec<BannerMatch> {
        grid.row(row)
            .iter()
            .enumerate()
            .filter(|(_, cell)| matches!(cell, Cell::Text(_)))
            .filter_map(|(col, cell)| {
                self.parse(&cell.text()).map(|(day, date)| BannerMatch {
                    col,
                    day,
                    date,
                })
            })
            .collect()
    }
}

impl Default for BannerPattern {
    fn default() -> Self {
        Self::new(YearDigits::default())
    }
}

/// Ascending indices of rows holding at least one banner cell.
///
/// Fails with [`ExtractError::NoScheduleStructure`] when the grid has none.
pub fn classify_rows(grid: &Grid, pattern: &BannerPattern) -> Result<Vec<usize>, ExtractError> {
    let rows: Vec<usize> = (0..grid.height())
        .filter(|row| !pattern.banners_in_row(grid, *row).is_empty())
        .collect();
    if rows.is_empty() {
        Err(ExtractError::NoScheduleStructure)
    } else {
        log::debug!("Found {} banner row(s): {:?}", rows.len(), rows);
        Ok(rows)
    }
}
