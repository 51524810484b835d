use std::time::Duration;

use chrono::NaiveDate;

use super::fixtures;
use super::{FakeBrowser, ScriptedOperator};
use crate::search::{page_rows, run, search_page_url, SearchConfig, SearchRow};
use crate::table::ResultTable;

const QUERY: &str = "commercial truck guidelines";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn config(dir: &std::path::Path, pages: usize) -> SearchConfig {
    SearchConfig {
        pages,
        settle: Duration::ZERO,
        output_path: dir.join("results.csv"),
        artifact_dir: dir.join("debug"),
    }
}

#[test]
fn test_page_rows_date_links() {
    let html = fixtures::load_html_fixture("search_results");
    let rows = page_rows(&html, 1, today());

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        SearchRow {
            title: "March 2021 Commercial Truck Guidelines".to_string(),
            link: "https://cdn.example.com/files/03.2021_Commercial_Truck_Guidelines.pdf"
                .to_string(),
            page: 1,
            month: "Mar".to_string(),
            year: "2021".to_string(),
        }
    );
    assert_eq!(rows[1].month, "Dec");
    assert_eq!(rows[1].year, "2020");
    // No date signal in the link: still a row, with blank date cells
    assert_eq!(rows[2].month, "");
    assert_eq!(rows[2].year, "");
}

#[test]
fn test_run_collects_pages_and_saves_debug_markup() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    let mut browser = FakeBrowser::default()
        .with_page(
            &search_page_url(QUERY, 1),
            fixtures::load_html_fixture("search_results"),
        )
        .with_page(
            &search_page_url(QUERY, 2),
            fixtures::load_html_fixture("search_blocked"),
        );
    browser.supports_screenshots = true;
    let mut operator = ScriptedOperator::new(&[""]);
    let mut table = ResultTable::new(&config.output_path);

    let finished = run(&mut browser, &mut operator, QUERY, &mut table, &config, today()).unwrap();

    assert!(finished);
    assert_eq!(operator.prompts.len(), 1);
    assert_eq!(table.len(), 3);
    assert!(table.rows().iter().all(|row| row.page == 1));
    assert!(dir.path().join("debug/debug_web_page_2.html").exists());
    assert!(config.output_path.exists());
    assert_eq!(
        browser.screenshots,
        vec![
            dir.path().join("debug/page1_results.png"),
            dir.path().join("debug/page2_results.png"),
        ]
    );
}

#[test]
fn test_run_stops_when_operator_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4);
    let mut browser = FakeBrowser::default().with_page(
        &search_page_url(QUERY, 1),
        fixtures::load_html_fixture("search_results"),
    );
    let mut operator = ScriptedOperator::new(&["q"]);
    let mut table = ResultTable::new(&config.output_path);

    let finished = run(&mut browser, &mut operator, QUERY, &mut table, &config, today()).unwrap();

    assert!(!finished);
    assert!(table.is_empty());
    assert_eq!(browser.visited.len(), 1);
    assert!(!config.output_path.exists());
}
