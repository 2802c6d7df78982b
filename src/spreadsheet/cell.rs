use crate::grid::Cell;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

/// How the raw text of a worksheet `<c>` element should be read.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (0/1)
    Boolean,
    /// Plain numeric values
    Number,
    /// Date/time serial numbers from the 1900 epoch
    Serial1900,
    /// Date/time serial numbers from the 1904 epoch
    Serial1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    fn serial(is_1904: bool) -> Self {
        if is_1904 { Self::Serial1904 } else { Self::Serial1900 }
    }

    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "14" | "15" | "16" | "17" | "18" | "19" | "20" | "21" | "22" | "45" | "46" | "47" => {
                Some(Self::serial(is_1904))
            }
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Any date or time token outside literals and bracketed sections makes it a serial.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' | 'H' | 'h' | 'S' | 's' => return Self::serial(is_1904),
                _ => (),
            }
        }
        Self::Number
    }
}

/// Converts a spreadsheet serial number to a date/time.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400f64).round() as i64;
    let (epoch, days) = if is_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, days)
    } else if days > 0 && days < 60 {
        (Cell::epoch_day(), days + 1)
    } else {
        (Cell::epoch_day(), days)
    };
    epoch
        .checked_add_signed(Duration::try_days(days)?)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Parses `t="d"` values: full date-times, dates, or bare times.
pub(crate) fn iso_to_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().and_then(|date| date.and_hms_opt(0, 0, 0)))
        .or_else(|| {
            chrono::NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
                .ok()
                .map(|time| Cell::epoch_day().and_time(time))
        })
}

/// Builds a grid cell from the raw `<c>` value. Values that cannot be read as their
/// declared type degrade to text or empty rather than failing the load.
pub(crate) fn to_grid_cell(kind: CellType, value: &str, shared_strings: &[String]) -> Cell {
    match kind {
        CellType::Empty | CellType::Error => Cell::Empty,
        CellType::Boolean => Cell::Text(if value == "1" { "TRUE" } else { "FALSE" }.to_owned()),
        CellType::InlineString => Cell::from(value),
        CellType::SharedString => match value.trim().parse::<usize>().ok().and_then(|index| shared_strings.get(index)) {
            Some(text) => Cell::from(text.as_str()),
            None => {
                log::trace!("Shared string index '{value}' out of range");
                Cell::Empty
            }
        },
        CellType::Number => match value.trim().parse::<f64>() {
            Ok(number) => Cell::Number(number),
            Err(_) => Cell::from(value),
        },
        CellType::Serial1900 | CellType::Serial1904 => {
            let number = value.trim().parse::<f64>().ok();
            match number.and_then(|number| serial_to_datetime(number, kind == CellType::Serial1904)) {
                Some(datetime) => Cell::Temporal(datetime),
                None => number.map(Cell::Number).unwrap_or_else(|| Cell::from(value)),
            }
        }
        CellType::IsoDateTime => iso_to_datetime(value.trim())
            .map(Cell::Temporal)
            .unwrap_or_else(|| Cell::from(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("hh:mm", false), CellType::Serial1900);
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy", true), CellType::Serial1904);
        assert_eq!(CellType::parse_custom_number_format("0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("\"day\"0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.0", false), CellType::Number);
        assert_eq!(CellType::parse_builtin_number_format_id("20", false), Some(CellType::Serial1900));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn serials_convert_to_datetimes() {
        let time = serial_to_datetime(0.409722222, false).unwrap();
        assert_eq!(time.date(), Cell::epoch_day());
        assert_eq!(time.time(), NaiveTime::from_hms_opt(9, 50, 0).unwrap());

        let date = serial_to_datetime(45516.0, false).unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 8, 12).unwrap());

        let date = serial_to_datetime(1.0, false).unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());

        let date = serial_to_datetime(0.0, true).unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(1904, 1, 1).unwrap());
        assert_eq!(serial_to_datetime(-1.0, false), None);
    }

    #[test]
    fn raw_values_become_grid_cells() {
        let shared = vec!["Monday 12/08/24".to_owned()];
        assert_eq!(to_grid_cell(CellType::SharedString, "0", &shared), Cell::from("Monday 12/08/24"));
        assert_eq!(to_grid_cell(CellType::SharedString, "7", &shared), Cell::Empty);
        assert_eq!(to_grid_cell(CellType::Number, "950", &shared), Cell::Number(950.0));
        assert_eq!(to_grid_cell(CellType::Boolean, "1", &shared), Cell::from("TRUE"));
        assert_eq!(to_grid_cell(CellType::Error, "#N/A", &shared), Cell::Empty);
        assert_eq!(to_grid_cell(CellType::Serial1900, "abc", &shared), Cell::from("abc"));
        assert_eq!(
            to_grid_cell(CellType::IsoDateTime, "09:50:00", &shared).text(),
            "09:50"
        );
    }
}
