//! Time label normalization for the rows under each banner.
use crate::grid::Cell;
use crate::grid::Grid;
use chrono::NaiveTime;
use regex::Captures;
use regex::Regex;

/// `H:MM` / `HH:MM` with optional AM/PM, optionally followed by `-` and a second one.
const TIME_RANGE: &str = r"^\d{1,2}:\d{2}\s*(?:[AaPp][Mm])?(?:\s*-\s*\d{1,2}:\d{2}\s*(?:[AaPp][Mm])?)?$";
/// `H:MM`, `H.MM` (a lone minute digit is read as tens, `9.5` is 09:50).
const SEPARATED_TIME: &str = r"^(\d{1,2})[:.](\d{1,2})(\s*[AaPp][Mm])?$";
/// `HMM` / `HHMM`.
const BARE_TIME: &str = r"^(\d{1,2})(\d{2})(\s*[AaPp][Mm])?$";

/// Formats time cells into `HH:MM` labels.
#[derive(Clone, Debug)]
pub struct TimeFormatter {
    range: Regex,
    separated: Regex,
    bare: Regex,
    /// Whether `HMM`/`HHMM` without AM/PM reads as a time shape
    bare_digit_times: bool,
}

impl TimeFormatter {
    pub fn new() -> Self {
        TimeFormatter {
            range: Regex::new(TIME_RANGE).expect("Hardcode regex pattern"),
            separated: Regex::new(SEPARATED_TIME).expect("Hardcode regex pattern"),
            bare: Regex::new(BARE_TIME).expect("Hardcode regex pattern"),
            bare_digit_times: false,
        }
    }

    /// Treats unsuffixed digit runs such as `0950` as time shapes too.
    pub fn with_bare_digit_times(mut self, enabled: bool) -> Self {
        self.bare_digit_times = enabled;
        self
    }

    /// Renders a cell as a time label, `""` for blank cells.
    pub fn format(&self, cell: &Cell) -> String {
        match cell {
            Cell::Temporal(datetime) => datetime.format("%H:%M").to_string(),
            _ => self.format_text(&cell.text()),
        }
    }

    /// Normalizes a time string; unrecognized text comes back trimmed.
    pub fn format_text(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() || self.range.is_match(text) {
            return text.to_owned();
        }
        self.separated
            .captures(text)
            .or_else(|| self.bare.captures(text))
            .and_then(|captures| normalize(&captures))
            .unwrap_or_else(|| {
                log::trace!("Keep unrecognized time label '{text}' verbatim");
                text.to_owned()
            })
    }

    /// Returns true for text that reads as a time label rather than an activity code.
    ///
    /// Unless enabled with [`TimeFormatter::with_bare_digit_times`], bare digit runs only
    /// count with an AM/PM suffix, so numeric codes like `101` survive.
    pub fn is_time_shaped(&self, text: &str) -> bool {
        let text = text.trim();
        self.range.is_match(text)
            || self.separated.captures(text).and_then(|captures| normalize(&captures)).is_some()
            || self
                .bare
                .captures(text)
                .filter(|captures| self.bare_digit_times || captures.get(3).is_some())
                .and_then(|captures| normalize(&captures))
                .is_some()
    }
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(captures: &Captures) -> Option<String> {
    let hour: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minute = captures.get(2)?.as_str();
    let minute: u32 = if minute.len() == 1 {
        minute.parse::<u32>().ok()? * 10
    } else {
        minute.parse().ok()?
    };
    NaiveTime::from_hms_opt(hour, minute, 0)?;
    let suffix = captures.get(3).map(|suffix| suffix.as_str()).unwrap_or("");
    Some(format!("{hour:02}:{minute:02}{suffix}"))
}

/// One label per column: the first time row with a non-blank label wins, else `""`.
pub fn resolve_times<I>(grid: &Grid, time_rows: &[usize], columns: I, formatter: &TimeFormatter) -> Vec<String>
where
    I: IntoIterator<Item = usize>,
{
    columns
        .into_iter()
        .map(|col| {
            time_rows
                .iter()
                .map(|row| formatter.format(grid.get(*row, col)))
                .find(|label| !label.is_empty())
                .unwrap_or_default()
        })
        .collect()
}
