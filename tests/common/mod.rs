#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use mnu_ebooks::config::Config;
use mnu_ebooks::pipeline::RunRequest;
use rust_xlsxwriter::Workbook;

pub const ANALYTICS_CSV: &str = "\
MMS Id,Portfolio Id,Electronic Collection Public Name,Publisher,Publication Place,Publication Date,Title,ISBN,Available For Group
99123,'4567',EBSCO Academic,Acme Press,Minneapolis :,2020,Intro to X,0000000001,Twin Cities
99124,5000,JSTOR Books,Beta House,Paris ;,2019,Advanced Y,,Twin Cities
99125,6000,ProQuest,Gamma,London,2018,Unlisted Z,,
";

pub const URLS_CSV: &str = "\
Resource Type,Portfolio Id,URL
Electronic Book,4567,http://login.ezproxy.example.edu/x
Electronic Book,'6000',https://login.ezproxy.example.edu/z
";

pub const CONCORDANCE_CSV: &str = "\
MMS Id,Bookstore ISBN
99123,9780000000001
99124,9780000000002
99124,9789999999999
";

/// Input files laid out in a temporary directory.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub request: RunRequest,
    pub config: Config,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_urls(URLS_CSV)
    }

    pub fn with_urls(urls: &str) -> Self {
        let dir = tempfile::tempdir().expect("temporary directory");
        let analytics = dir.path().join("analytics.csv");
        let url_export = dir.path().join("urls.csv");
        let concordance = dir.path().join("isbns.csv");
        let bookstore = dir.path().join("fall_books.xlsx");

        fs::write(&analytics, ANALYTICS_CSV).expect("analytics written");
        fs::write(&url_export, urls).expect("urls written");
        fs::write(&concordance, CONCORDANCE_CSV).expect("concordance written");
        write_bookstore(&bookstore);

        let config = Config {
            concordance,
            ..Config::default()
        };
        let request = RunRequest {
            analytics,
            url_export,
            bookstore,
            sheet: "Fall".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, 5).expect("valid date"),
        };

        Self { dir, request, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Bookstore workbook with the catalog on "Fall" and a second "Notes" sheet.
/// The first ISBN is stored as a number, the way bookstore exports often do.
pub fn write_bookstore(path: &Path) {
    let mut workbook = Workbook::new();

    let fall = workbook.add_worksheet();
    fall.set_name("Fall").expect("sheet named");
    for (col, header) in ["ISBN", "Title", "Course"].iter().enumerate() {
        fall.write_string(0, col as u16, *header).expect("header written");
    }
    fall.write_number(1, 0, 9780000000001.0).expect("cell written");
    fall.write_string(1, 1, "Intro to X (Course Ed.)").expect("cell written");
    fall.write_string(1, 2, "X 101").expect("cell written");
    fall.write_string(2, 0, "9780000000002").expect("cell written");
    fall.write_string(2, 1, "Advanced Y").expect("cell written");
    fall.write_string(2, 2, "Y 201").expect("cell written");
    fall.write_string(3, 0, "9781111111111").expect("cell written");
    fall.write_string(3, 1, "Unheld").expect("cell written");
    fall.write_string(3, 2, "Z 301").expect("cell written");

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").expect("sheet named");
    notes.write_string(0, 0, "Prepared by").expect("cell written");
    notes.write_string(0, 1, "Bookstore").expect("cell written");
    notes.write_string(1, 0, "Count").expect("cell written");
    notes.write_number(1, 1, 3.0).expect("cell written");

    workbook.save(path).expect("bookstore workbook saved");
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    workbook.sheet_names().to_vec()
}

/// Reads a sheet as text, one vector per row, header included.
pub fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    let range = workbook
        .worksheet_range(sheet)
        .expect("sheet present")
        .expect("sheet readable");
    range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Index of a header in the first row.
pub fn column(rows: &[Vec<String>], name: &str) -> usize {
    rows[0]
        .iter()
        .position(|header| header == name)
        .unwrap_or_else(|| panic!("column {name} missing from {:?}", rows[0]))
}
