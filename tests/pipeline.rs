mod common;

use std::fs;

use common::{ANALYTICS_CSV, Fixture, column, read_sheet, sheet_names};
use mnu_ebooks::io::csv_read;
use mnu_ebooks::pipeline;
use mnu_ebooks::{ReportError, Stage};
use rust_xlsxwriter::Workbook;

#[test]
fn run_writes_views_ahead_of_template_sheets() {
    let fixture = Fixture::new();

    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    assert_eq!(summary.output, fixture.path("fall_books_mnu_ebooks_2024-08-05.xlsx"));
    assert_eq!(
        sheet_names(&summary.output),
        ["Not Owned", "Already Owned", "Full List", "Alma Data", "Fall", "Notes"]
    );
    assert_eq!(summary.alma_rows, 3);
    assert_eq!(summary.full_list_rows, 3);
    assert_eq!(summary.already_owned_rows, 1);
    assert_eq!(summary.not_owned_rows, 2);
}

#[test]
fn full_list_carries_both_titles_and_secure_url() {
    let fixture = Fixture::new();
    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let rows = read_sheet(&summary.output, "Full List");
    assert_eq!(
        rows[0],
        [
            "ISBN",
            "Title",
            "Course",
            "Supplier/Interface",
            "Publisher",
            "Publication Place",
            "Publication Date",
            "Alma Title",
            "URL"
        ]
    );
    assert_eq!(rows.len(), 4);

    let first = &rows[1];
    assert_eq!(first[column(&rows, "ISBN")], "9780000000001");
    assert_eq!(first[column(&rows, "Title")], "Intro to X (Course Ed.)");
    assert_eq!(first[column(&rows, "Alma Title")], "Intro to X");
    assert_eq!(first[column(&rows, "Publication Place")], "Minneapolis");
    assert_eq!(
        first[column(&rows, "URL")],
        "https://login.ezproxy.example.edu/x"
    );

    let advanced = &rows[2];
    assert_eq!(advanced[column(&rows, "Alma Title")], "Advanced Y");
    assert_eq!(advanced[column(&rows, "URL")], "");
}

#[test]
fn owned_and_not_owned_partition_the_full_list() {
    let fixture = Fixture::new();
    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let full = read_sheet(&summary.output, "Full List");
    let owned = read_sheet(&summary.output, "Already Owned");
    let not_owned = read_sheet(&summary.output, "Not Owned");
    assert_eq!(owned.len() - 1 + not_owned.len() - 1, full.len() - 1);

    assert_eq!(
        owned[0],
        [
            "ISBN",
            "Course",
            "Supplier/Interface",
            "Publisher",
            "Publication Place",
            "Publication Date",
            "Title",
            "URL"
        ]
    );
    assert_eq!(owned[1][column(&owned, "Title")], "Intro to X");

    assert_eq!(not_owned[0], ["ISBN", "Title", "Course"]);
    let isbns: Vec<&str> = not_owned[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(isbns, ["9780000000002", "9781111111111"]);
    assert_eq!(not_owned[2][1], "Unheld");
}

#[test]
fn alma_data_keeps_identifiers_as_text() {
    let fixture = Fixture::new();
    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let rows = read_sheet(&summary.output, "Alma Data");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][column(&rows, "ISBN")], "0000000001");
    assert_eq!(rows[1][column(&rows, "Portfolio Id")], "4567");
    assert_eq!(rows[1][column(&rows, "Bookstore ISBN")], "9780000000001");
    assert_eq!(rows[2][column(&rows, "Bookstore ISBN")], "9780000000002");
    assert_eq!(rows[3][column(&rows, "Bookstore ISBN")], "");
    assert_eq!(rows[3][column(&rows, "Resource Type")], "Electronic Book");
}

#[test]
fn template_sheets_are_copied_verbatim() {
    let fixture = Fixture::new();
    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let notes = read_sheet(&summary.output, "Notes");
    assert_eq!(notes, [["Prepared by", "Bookstore"], ["Count", "3"]]);
    let fall = read_sheet(&summary.output, "Fall");
    assert_eq!(fall[1][0], "9780000000001");
}

#[test]
fn rerun_on_same_date_reproduces_every_sheet() {
    let fixture = Fixture::new();
    let first = pipeline::run(&fixture.request, &fixture.config).expect("first run");
    let before: Vec<_> = sheet_names(&first.output)
        .iter()
        .map(|name| read_sheet(&first.output, name))
        .collect();

    let second = pipeline::run(&fixture.request, &fixture.config).expect("second run");
    let after: Vec<_> = sheet_names(&second.output)
        .iter()
        .map(|name| read_sheet(&second.output, name))
        .collect();

    assert_eq!(first.output, second.output);
    assert_eq!(before, after);
}

#[test]
fn intermediate_exports_are_written_on_request() {
    let mut fixture = Fixture::new();
    let export_dir = fixture.path("debug");
    fixture.config.export_dir = Some(export_dir.clone());

    pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let alma = csv_read::read_records(&export_dir.join(pipeline::ALMA_DATA_EXPORT))
        .expect("alma export readable");
    let merged = csv_read::read_records(&export_dir.join(pipeline::MERGED_EXPORT))
        .expect("merged export readable");
    assert_eq!(alma.len(), 3);
    assert_eq!(merged.len(), 3);
    assert!(merged.has_column("Title (Alma)"));
}

#[test]
fn unrecognised_wide_url_export_fails_in_url_enrichment() {
    let fixture = Fixture::with_urls("a,b,c,d\nx,4567,http://x,extra\n");

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(
        error,
        ReportError::Stage {
            stage: Stage::UrlEnrichment,
            ..
        }
    ));
    assert!(matches!(error.root(), ReportError::SchemaMismatch(_)));
}

#[test]
fn unrecognised_three_column_url_export_is_read_positionally() {
    let fixture = Fixture::with_urls(
        "Kind,Id,Link target\nElectronic Book,4567,http://login.ezproxy.example.edu/x\n",
    );

    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    assert_eq!(summary.already_owned_rows, 1);
}

#[test]
fn missing_sheet_is_reported() {
    let mut fixture = Fixture::new();
    fixture.request.sheet = "Spring".to_string();

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(
        error.root(),
        ReportError::MissingSheet { sheet, .. } if sheet == "Spring"
    ));
}

#[test]
fn missing_analytics_file_is_reported() {
    let mut fixture = Fixture::new();
    fixture.request.analytics = fixture.path("nope.csv");

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(error.root(), ReportError::MissingInput(path) if path.ends_with("nope.csv")));
    assert!(error.to_string().starts_with("ISBN enrichment failed"));
}

#[test]
fn analytics_row_wider_than_header_is_a_format_error() {
    let fixture = Fixture::new();
    fs::write(
        &fixture.request.analytics,
        "MMS Id,Portfolio Id,Electronic Collection Public Name,Publication Place\n\
         99123,4567,EBSCO,Minneapolis,stray\n",
    )
    .expect("analytics rewritten");

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(
        error,
        ReportError::Stage {
            stage: Stage::IsbnEnrichment,
            ..
        }
    ));
    assert!(matches!(error.root(), ReportError::Format { path, .. } if path.ends_with("analytics.csv")));
}

#[test]
fn analytics_with_invalid_utf8_is_a_format_error() {
    let fixture = Fixture::new();
    let mut bytes = b"MMS Id,Portfolio Id,Electronic Collection Public Name,Publication Place\n".to_vec();
    bytes.extend_from_slice(b"99123,4567,EBSCO,Montr\xe9al\n");
    fs::write(&fixture.request.analytics, bytes).expect("analytics rewritten");

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(error.to_string().starts_with("ISBN enrichment failed"));
    assert!(matches!(error.root(), ReportError::Format { .. }));
}

#[test]
fn repeated_analytics_headers_are_suffixed() {
    let fixture = Fixture::new();
    let analytics: String = ANALYTICS_CSV
        .lines()
        .enumerate()
        .map(|(index, line)| match index {
            0 => format!("{line},Subject,Subject\n"),
            _ => format!("{line},History,Maps\n"),
        })
        .collect();
    fs::write(&fixture.request.analytics, analytics).expect("analytics rewritten");

    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let alma = read_sheet(&summary.output, "Alma Data");
    assert_eq!(alma[1][column(&alma, "Subject")], "History");
    assert_eq!(alma[1][column(&alma, "Subject.1")], "Maps");
    let full = read_sheet(&summary.output, "Full List");
    assert_eq!(full[1][column(&full, "Subject.1")], "Maps");
}

#[test]
fn bookstore_headers_differing_only_by_case_are_kept_apart() {
    let mut fixture = Fixture::new();
    let bookstore = fixture.path("cased.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Fall").expect("sheet named");
    for (col, header) in ["ISBN", "Title", "Course", "course"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("header written");
    }
    for (col, value) in ["9781111111111", "Unheld", "Z 301", "z301"].iter().enumerate() {
        sheet.write_string(1, col as u16, *value).expect("cell written");
    }
    workbook.save(&bookstore).expect("bookstore saved");
    fixture.request.bookstore = bookstore;

    let summary = pipeline::run(&fixture.request, &fixture.config).expect("pipeline run");

    let not_owned = read_sheet(&summary.output, "Not Owned");
    assert_eq!(not_owned[0], ["ISBN", "Title", "Course", "course.1"]);
    assert_eq!(not_owned[1], ["9781111111111", "Unheld", "Z 301", "z301"]);
}

#[test]
fn view_columns_clashing_by_case_are_written_as_a_table() {
    use mnu_ebooks::io::excel_write::{self, SheetTable};
    use mnu_ebooks::model::RecordSet;

    let fixture = Fixture::new();
    let target = fixture.path("clash.xlsx");
    let records = RecordSet::with_rows(
        "Full List",
        vec!["Publisher".to_string(), "publisher".to_string()],
        vec![vec![Some("Acme".to_string()), Some("acme press".to_string())]],
    )
    .expect("row fits");
    let table = SheetTable {
        sheet_name: "Full List".to_string(),
        records,
    };

    excel_write::write_workbook(&target, &[table], &[]).expect("workbook written");

    let rows = read_sheet(&target, "Full List");
    assert_eq!(rows, [["Publisher", "publisher.1"], ["Acme", "acme press"]]);
}

#[test]
fn catalog_without_isbn_column_is_a_missing_column() {
    let mut fixture = Fixture::new();
    fixture.config.catalog.isbn = "EAN".to_string();
    fixture.request.sheet = "Notes".to_string();

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(
        error.root(),
        ReportError::MissingColumn { column, .. } if column == "ISBN"
    ));
}

#[test]
fn missing_concordance_is_reported() {
    let fixture = Fixture::new();
    fs::remove_file(&fixture.config.concordance).expect("concordance removed");

    let error = pipeline::run(&fixture.request, &fixture.config).unwrap_err();

    assert!(matches!(error.root(), ReportError::MissingInput(_)));
}

#[test]
fn unwritable_output_location_is_a_write_error() {
    use mnu_ebooks::io::excel_write::{self, SheetTable};
    use mnu_ebooks::model::RecordSet;

    let fixture = Fixture::new();
    let target = fixture.path("missing-dir").join("report.xlsx");
    let table = SheetTable {
        sheet_name: "Full List".to_string(),
        records: RecordSet::new("Full List", vec!["ISBN".to_string()]),
    };

    let error = excel_write::write_workbook(&target, &[table], &[]).unwrap_err();

    assert!(matches!(error, ReportError::Write { .. }));
}
