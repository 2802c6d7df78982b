use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::grid::Cell;
use crate::grid::Grid;
use crate::helpers::reader::SourceReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::to_grid_cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// An Excel XLSX workbook opened for reading timetable grids
pub struct XlsxWorkbook {
    /// File name of the workbook
    name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<SourceReader>,
    /// Cell types indexed by style ID, used to spot date/time serials
    number_formats: Vec<CellType>,
    /// Worksheets as (name, zip_path) pairs, in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxWorkbook {
    /// Opens an XLSX file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<XlsxWorkbook, TimetableError> {
        let name = path.as_ref().to_string_lossy().to_string();
        let reader = SourceReader::open(&path).with_prefix(&format!("Open '{name}'"))?;
        Self::from_reader(name, reader)
    }

    /// Opens an XLSX workbook held in memory
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxWorkbook, TimetableError> {
        Self::from_reader(name.to_owned(), SourceReader::from_bytes(bytes))
    }

    fn from_reader(name: String, reader: SourceReader) -> Result<XlsxWorkbook, TimetableError> {
        let (zip, number_formats, sheets) = excel::open(&name, reader, load_workbook, load_number_formats)
            .with_prefix(&format!("Open workbook '{name}'"))?;
        log::debug!("Opened '{}' with {} sheet(s)", name, sheets.len());
        Ok(XlsxWorkbook {
            name,
            zip,
            number_formats,
            sheets,
        })
    }

    /// Loads the shared string table; workbooks without one have no shared strings
    fn load_shared_strings(&mut self) -> Result<Vec<String>, TimetableError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }

    /// Parses one worksheet into sparse grid cells, rebased on the range origin
    fn read_cells(&mut self, zip_path: &str, criteria: &Criteria, shared_strings: &[String]) -> Result<Vec<((usize, usize), Cell)>, TimetableError> {
        let range = criteria.range.unwrap_or_default();
        let (row_origin, col_origin) = range.origin();
        let mut cells = Vec::new();
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let number_formats = &self.number_formats;
        let mut reader = self.zip.xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::MissingPart(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(index) = event.get_attribute_value("r")?.and_then(|r| row_to_index(&r)) {
                    row_count = index;
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                if range.after_row_upper_bound(row) {
                    break;
                } else if range.contains(row, col) {
                    kind = event.get_attribute_value("t")?.map(|t| {
                        match t.as_ref() {
                            "inlineStr" | "str" => CellType::InlineString,
                            "s" => CellType::SharedString,
                            "d" => CellType::IsoDateTime,
                            "b" => CellType::Boolean,
                            "e" => CellType::Error,
                            _ => CellType::Number,
                        }
                    }).unwrap_or(CellType::Number);
                    if let Some(format_id) = event.get_attribute_value("s")? {
                        if kind == CellType::Number {
                            kind = format_id.parse::<usize>().ok()
                                .and_then(|index| number_formats.get(index).copied())
                                .unwrap_or(CellType::Number);
                        }
                    }
                } else {
                    kind = CellType::default();
                }
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind == CellType::Error {
                    log::trace!("Treat error value '{}' at {} as empty", value, index_to_reference(row, col));
                } else if kind != CellType::Empty && !value.is_empty() {
                    let cell = to_grid_cell(kind, &value, shared_strings);
                    cells.push(((row - row_origin, col - col_origin), cell));
                }
                kind = CellType::default();
            },
        });
        Ok(cells)
    }
}

impl Spreadsheet for XlsxWorkbook {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads the first sheet accepted by the criteria into a grid
    fn read_grid(&mut self, criteria: &Criteria) -> Result<Grid, TimetableError> {
        let (sheet_name, zip_path) = self.sheets
            .iter()
            .find(|(name, _)| criteria.accept(name))
            .cloned()
            .ok_or_else(|| SpreadsheetError::SheetNotFound(self.name.to_owned()))?;
        let shared_strings = self.load_shared_strings()?;
        let cells = self.read_cells(&zip_path, criteria, &shared_strings)
            .with_prefix(&format!("Read sheet '{sheet_name}' of '{}'", self.name))?;
        let grid = Grid::from_sparse(cells);
        log::debug!("Read sheet '{}' as a {}x{} grid", sheet_name, grid.height(), grid.width());
        Ok(grid)
    }
}

/// Loads sheet names, their XML paths and the date system from xl/workbook.xml
fn load_workbook(zip: &mut ZipArchive<SourceReader>) -> Result<(Vec<(String, String)>, bool), TimetableError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::MissingPart("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads style-indexed cell types from xl/styles.xml
fn load_number_formats(zip: &mut ZipArchive<SourceReader>, is_1904: bool) -> Result<Vec<CellType>, TimetableError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            if let Some(id) = event.get_attribute_value("numFmtId")? {
                format_indexes.push(id.to_string());
            }
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string content up to `end_tag`, skipping phonetic annotations
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, SourceReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TimetableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::spreadsheet::range::Range;
    use glob::Pattern;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<workbookPr/>
<sheets><sheet name="Cover" sheetId="1" r:id="rId1"/><sheet name="Exams" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="hh:mm"/></numFmts>
<cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="164"/></cellXfs>
</styleSheet>"#;

    const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="5">
<si><t>Monday 12/08/24</t></si>
<si><t>Tuesday 13/08/24</t></si>
<si><r><t>Lab</t></r><r><t xml:space="preserve"> A</t></r></si>
<si><t>CS101</t></si>
<si><t>MA&amp;201</t></si>
</sst>"#;

    const COVER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Examination timetable</t></is></c></row>
</sheetData></worksheet>"#;

    const EXAMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="B1" t="s"><v>0</v></c><c r="D1" t="s"><v>1</v></c></row>
<row r="2"><c r="B2" s="1"><v>0.375</v></c><c r="C2" t="str"><v>11:00</v></c><c r="D2"><v>900</v></c></row>
<row r="3"><c r="A3" t="s"><v>2</v></c><c r="B3" t="s"><v>3</v></c><c r="C3" t="e"><v>#REF!</v></c><c r="D3" t="s"><v>4</v></c></row>
</sheetData></worksheet>"#;

    /// Builds an in-memory workbook from (path, xml) parts.
    pub(crate) fn build_workbook(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, xml) in parts {
            writer.start_file(*path, SimpleFileOptions::default()).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn exam_workbook() -> Vec<u8> {
        build_workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", COVER),
            ("xl/worksheets/sheet2.xml", EXAMS),
        ])
    }

    fn exams_criteria() -> Criteria {
        Criteria {
            sheet_name_patterns: Some(vec![Pattern::new("Exam*").unwrap()]),
            range: None,
        }
    }

    #[test]
    fn lists_sheets_in_workbook_order() {
        let workbook = XlsxWorkbook::from_bytes("exams.xlsx", exam_workbook()).unwrap();
        assert_eq!(workbook.name(), "exams.xlsx");
        assert_eq!(workbook.sheet_names(), vec!["Cover", "Exams"]);
    }

    #[test]
    fn first_sheet_by_default() {
        let mut workbook = XlsxWorkbook::from_bytes("exams.xlsx", exam_workbook()).unwrap();
        let grid = workbook.read_grid(&Criteria::default()).unwrap();
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.get(0, 0), &Cell::from("Examination timetable"));
    }

    #[test]
    fn reads_cells_by_type() {
        let mut workbook = XlsxWorkbook::from_bytes("exams.xlsx", exam_workbook()).unwrap();
        let grid = workbook.read_grid(&exams_criteria()).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.get(0, 0), &Cell::Empty);
        assert_eq!(grid.get(0, 1), &Cell::from("Monday 12/08/24"));
        assert!(matches!(grid.get(1, 1), Cell::Temporal(_)));
        assert_eq!(grid.get(1, 1).text(), "09:00");
        assert_eq!(grid.get(1, 2), &Cell::from("11:00"));
        assert_eq!(grid.get(1, 3), &Cell::Number(900.0));
        assert_eq!(grid.get(2, 0), &Cell::from("Lab A"));
        assert_eq!(grid.get(2, 2), &Cell::Empty);
        assert_eq!(grid.get(2, 3), &Cell::from("MA&201"));
    }

    #[test]
    fn range_rebases_the_grid() {
        let mut workbook = XlsxWorkbook::from_bytes("exams.xlsx", exam_workbook()).unwrap();
        let criteria = Criteria {
            range: Some(Range::try_from("B2:C3").unwrap()),
            ..exams_criteria()
        };
        let grid = workbook.read_grid(&criteria).unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.get(0, 0).text(), "09:00");
        assert_eq!(grid.get(1, 0), &Cell::from("CS101"));
    }

    #[test]
    fn unknown_sheet_is_a_source_error() {
        let mut workbook = XlsxWorkbook::from_bytes("exams.xlsx", exam_workbook()).unwrap();
        let criteria = Criteria {
            sheet_name_patterns: Some(vec![Pattern::new("Week*").unwrap()]),
            range: None,
        };
        let error = workbook.read_grid(&criteria).err().unwrap();
        assert!(matches!(error, TimetableError::SpreadsheetError(SpreadsheetError::SheetNotFound(_))));
        assert!(!error.is_structural());
    }

    #[test]
    fn malformed_reference_takes_running_position() {
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Lab A</t></is></c><c r="ZZZZZZZZZZZZZZZZ1" t="inlineStr"><is><t>CS101</t></is></c></row>
</sheetData></worksheet>"#;
        let bytes = build_workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/worksheets/sheet1.xml", sheet),
        ]);
        let mut workbook = XlsxWorkbook::from_bytes("odd.xlsx", bytes).unwrap();
        let grid = workbook.read_grid(&Criteria::default()).unwrap();
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.get(0, 1), &Cell::from("CS101"));
    }

    #[test]
    fn rejects_non_archives_and_missing_parts() {
        assert!(XlsxWorkbook::from_bytes("notes.xlsx", b"plain text".to_vec()).is_err());
        let bytes = build_workbook(&[("xl/workbook.xml", WORKBOOK)]);
        let error = XlsxWorkbook::from_bytes("broken.xlsx", bytes).err().unwrap();
        assert!(error.to_string().contains("xl/_rels/workbook.xml.rels"));
    }
}
