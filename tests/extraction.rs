use rusty_timetable::export::to_json;
use rusty_timetable::extract;
use rusty_timetable::Cell;
use rusty_timetable::Criteria;
use rusty_timetable::ExtractError;
use rusty_timetable::ExtractOptions;
use rusty_timetable::Grid;
use rusty_timetable::ScheduleEntry;
use rusty_timetable::Spreadsheet;
use rusty_timetable::TimetableError;
use rusty_timetable::XlsxWorkbook;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn two_day_grid(room: &str) -> Grid {
    Grid::from_strings([
        vec!["", "Monday 12/08/24", "", "Tuesday 13/08/24"],
        vec!["", "09:00", "11:00", "09:00"],
        vec![room, "CS101", "", "MA201"],
    ])
}

fn entry(room: &str, day: &str, date: &str, time: &str, code: &str) -> ScheduleEntry {
    ScheduleEntry {
        room: room.to_owned(),
        day: day.to_owned(),
        date: date.to_owned(),
        time: time.to_owned(),
        activity_code: code.to_owned(),
    }
}

#[test]
fn two_day_grid_end_to_end() {
    let entries = extract(&two_day_grid("Lab A"), &ExtractOptions::default()).unwrap();
    assert_eq!(
        entries,
        vec![
            entry("Lab A", "Monday", "12/08/24", "09:00", "CS101"),
            entry("Lab A", "Tuesday", "13/08/24", "09:00", "MA201"),
        ]
    );
}

#[test]
fn excluded_room_yields_nothing() {
    let entries = extract(&two_day_grid("CHAPEL"), &ExtractOptions::default()).unwrap();
    assert!(entries.is_empty());
    let entries = extract(&two_day_grid("chapel"), &ExtractOptions::default()).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn header_rows_never_yield_entries() {
    let grid = Grid::from_strings([
        vec!["", "Monday 12/08/24", ""],
        vec!["", "09:00", "11:00"],
        vec!["Room", "CODE", "CODE"],
        vec!["rooms", "CODE", "CODE"],
        vec!["Lab A", "CS101", "CS102"],
    ]);
    let entries = extract(&grid, &ExtractOptions::default()).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|entry| entry.room == "Lab A"));
}

#[test]
fn grid_without_banner_is_structural_failure() {
    let grid = Grid::from_strings([vec!["Room", "09:00"], vec!["Lab A", "CS101"]]);
    let error = extract(&grid, &ExtractOptions::default()).err().unwrap();
    assert_eq!(error, ExtractError::NoScheduleStructure);

    let error = TimetableError::from(error);
    assert!(error.is_structural());
}

#[test]
fn lone_banner_governs_through_last_column() {
    let grid = Grid::from_strings([
        vec!["", "Wednesday 14/08/2024", "", ""],
        vec!["", "08:00", "09:00", "10:00"],
        vec!["Lab B", "PH100", "PH200", "PH300"],
        vec!["Lab C", "", "CH100", "CHAPEL"],
    ]);
    let entries = extract(&grid, &ExtractOptions::default()).unwrap();
    assert_eq!(
        entries,
        vec![
            entry("Lab B", "Wednesday", "14/08/2024", "08:00", "PH100"),
            entry("Lab B", "Wednesday", "14/08/2024", "09:00", "PH200"),
            entry("Lab B", "Wednesday", "14/08/2024", "10:00", "PH300"),
            entry("Lab C", "Wednesday", "14/08/2024", "09:00", "CH100"),
        ]
    );
}

#[test]
fn extraction_is_idempotent() {
    let grid = two_day_grid("Lab A");
    let options = ExtractOptions::default();
    assert_eq!(extract(&grid, &options).unwrap(), extract(&grid, &options).unwrap());
}

#[test]
fn skip_label_removes_exactly_one_entry() {
    let before = extract(&two_day_grid("Lab A"), &ExtractOptions::default()).unwrap();
    let grid = Grid::from_strings([
        vec!["", "Monday 12/08/24", "", "Tuesday 13/08/24"],
        vec!["", "09:00", "11:00", "09:00"],
        vec!["Lab A", "Chapel", "", "MA201"],
    ]);
    let after = extract(&grid, &ExtractOptions::default()).unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert_eq!(after[0], before[1]);
}

#[test]
fn time_labels_are_normalized() {
    let nine_fifty = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap()
        .and_hms_opt(9, 50, 0)
        .unwrap();
    let grid = Grid::from_rows([
        vec![Cell::Empty, Cell::from("Friday 16/08/24"), Cell::Empty, Cell::Empty, Cell::Empty],
        vec![
            Cell::Empty,
            Cell::from("9.5"),
            Cell::from("0950"),
            Cell::Temporal(nine_fifty),
            Cell::from("9:00AM-11:00AM"),
        ],
        vec![Cell::from("Lab D"), Cell::from("A1"), Cell::from("A2"), Cell::from("A3"), Cell::from("A 4")],
    ]);
    let times: Vec<String> = extract(&grid, &ExtractOptions::default())
        .unwrap()
        .into_iter()
        .map(|entry| entry.time)
        .collect();
    assert_eq!(times, vec!["09:50", "09:50", "09:50", "9:00AM-11:00AM"]);
}

#[test]
fn workbook_to_json() {
    let bytes = {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let parts = [
            ("xl/workbook.xml", r#"<workbook xmlns:r="r"><sheets><sheet name="Week 1" sheetId="1" r:id="rId1"/></sheets></workbook>"#),
            ("xl/_rels/workbook.xml.rels", r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#),
            ("xl/worksheets/sheet1.xml", r#"<worksheet><sheetData>
<row r="1"><c r="B1" t="inlineStr"><is><t>Monday 12/08/24</t></is></c></row>
<row r="2"><c r="B2" t="inlineStr"><is><t>9.00</t></is></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>Lab A</t></is></c><c r="B3" t="inlineStr"><is><t>CS 101</t></is></c></row>
</sheetData></worksheet>"#),
        ];
        for (path, xml) in parts {
            writer.start_file(path, SimpleFileOptions::default()).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    };

    let mut workbook = XlsxWorkbook::from_bytes("week.xlsx", bytes).unwrap();
    let grid = workbook.read_grid(&Criteria::default()).unwrap();
    let entries = extract(&grid, &ExtractOptions::default()).unwrap();
    assert_eq!(entries, vec![entry("Lab A", "Monday", "12/08/24", "09:00", "CS101")]);

    let json = to_json(&entries).unwrap();
    assert!(json.contains(r#""activity_code": "CS101""#));
}
