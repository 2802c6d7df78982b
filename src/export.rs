//! JSON output for extracted schedule entries

use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::timetable::entry::ScheduleEntry;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

/// Renders entries as a JSON array indented by four spaces
pub fn to_json(entries: &[ScheduleEntry]) -> Result<String, TimetableError> {
    let mut buffer = Vec::new();
    write_pretty(entries, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes entries as JSON to `path`, replacing any existing file
pub fn write_json<P: AsRef<Path>>(entries: &[ScheduleEntry], path: P) -> Result<(), TimetableError> {
    let path = path.as_ref();
    let prefix = format!("Write '{}'", path.display());
    let file = File::create(path).map_err(TimetableError::from).with_prefix(&prefix)?;
    let mut writer = BufWriter::new(file);
    write_pretty(entries, &mut writer).with_prefix(&prefix)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::debug!("Wrote {} entries to '{}'", entries.len(), path.display());
    Ok(())
}

fn write_pretty<W: Write>(entries: &[ScheduleEntry], writer: W) -> Result<(), TimetableError> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    entries.serialize(&mut serializer)?;
    Ok(())
}
