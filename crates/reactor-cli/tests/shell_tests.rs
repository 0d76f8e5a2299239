//! Interactive shell tests
//!
//! Each test scripts the operator's keystrokes, runs the menu against the
//! in-memory store and a mocked feed, and checks what was printed.

use chrono::{NaiveDate, NaiveDateTime};
use reactor_cli::{CliError, Shell};
use reactor_common::StatusRecord;
use reactor_ingest::{
    IngestPipeline, MemoryStatusStore, ReactorQueries, SourceClient, StatusStore,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const FEED: &str = "ReportDt|Unit|Power
01/02/2024 08:00:00 AM|UnitA|75
01/02/2024 08:00:00 AM|UnitB|0
01/03/2024 08:00:00 AM|UnitB|bad
";

async fn mock_feed(status: u16, body: &str) -> MockServer {
    colored::control::set_override(false);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn history() -> Vec<StatusRecord> {
    vec![
        StatusRecord::new(at("2023-12-31 08:00:00"), "UnitA", 100),
        StatusRecord::new(at("2024-01-02 08:00:00"), "UnitA", 75),
        StatusRecord::new(at("2024-01-02 08:00:00"), "UnitB", 0),
        StatusRecord::new(at("2024-01-03 08:00:00"), "UnitB", 0),
        StatusRecord::new(at("2024-01-04 08:00:00"), "UnitB", 30),
        StatusRecord::new(at("2024-02-20 08:00:00"), "UnitC", 0),
        StatusRecord::new(at("2024-02-21 08:00:00"), "UnitC", 95),
    ]
}

/// Run the menu over `input` and return everything it printed
async fn run_shell(
    server: &MockServer,
    store: Arc<dyn StatusStore>,
    input: impl AsRef<[u8]>,
) -> (Result<(), CliError>, String) {
    let client = SourceClient::new(Duration::from_secs(5)).unwrap();
    let pipeline = IngestPipeline::new(store.clone(), client, format!("{}/feed.txt", server.uri()));
    let queries = ReactorQueries::new(store);

    let mut output = Vec::new();
    let result = {
        let mut shell = Shell::new(pipeline, queries, input.as_ref(), &mut output)
            .with_clock(at("2024-03-01 12:00:00"));
        shell.run().await
    };

    (result, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_exit_choice() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, "5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("Welcome to the program:"));
    assert!(output.contains("5) Exit"));
}

#[tokio::test]
async fn test_end_of_input_exits_cleanly() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, _) = run_shell(&server, store, "").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_invalid_choice_reprints_menu() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, "9\nhello\n5\n").await;

    assert!(result.is_ok());
    assert_eq!(output.matches("Please input a correct value.").count(), 2);
    assert_eq!(output.matches("Welcome to the program:").count(), 3);
}

#[tokio::test]
async fn test_non_utf8_input_is_an_invalid_choice() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, b"\xe9\n5\n").await;

    assert!(result.is_ok());
    assert_eq!(output.matches("Please input a correct value.").count(), 1);
    assert_eq!(output.matches("Welcome to the program:").count(), 2);
}

#[tokio::test]
async fn test_refresh_then_list_units() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, "4\n1\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("Data updated successfully!"));
    assert!(output.contains("2 rows loaded, 1 rows skipped."));
    assert!(output.contains("\nUnitA\nUnitB\n"));
}

#[tokio::test]
async fn test_refresh_with_header_only_feed() {
    let server = mock_feed(200, "ReportDt|Unit|Power\n").await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, "4\n1\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("No valid rows to insert."));
    assert!(output.contains("No reactors found."));
}

#[tokio::test]
async fn test_refresh_fetch_failure_stops_program() {
    let server = mock_feed(503, "").await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, _) = run_shell(&server, store, "4\n5\n").await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Status code: 503"));
}

#[tokio::test]
async fn test_refresh_header_mismatch_stops_program() {
    let server = mock_feed(200, "Date|Unit|Power\n").await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, _) = run_shell(&server, store, "4\n5\n").await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Expected header"));
}

#[tokio::test]
async fn test_store_failure_returns_to_menu() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());
    store.drop_table().await.unwrap();

    let (result, output) = run_shell(&server, store, "1\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("Error: Database error"));
    assert_eq!(output.matches("Welcome to the program:").count(), 2);
}

#[tokio::test]
async fn test_reactor_detail_running() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "2\n  UnitA \n\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("*** UnitA ***"));
    assert!(output.contains("This reactor is running as of 2024-01-02"));
    assert!(output.contains("Reactor power level: 75"));
    assert!(output.contains("Days reactor was down in the last 365 days: 0"));
    assert!(output.contains("Last date the reactor was down: never"));
    assert!(output.contains("Press Enter to continue..."));
}

#[tokio::test]
async fn test_reactor_detail_low_power_with_outages() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "2\nUnitB\n\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("This reactor is running low power as of 2024-01-04"));
    assert!(output.contains("Days reactor was down in the last 365 days: 2"));
    assert!(output.contains("Last date the reactor was down: 2024-01-03"));
}

#[tokio::test]
async fn test_reactor_detail_unknown_unit() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "2\nunita\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("No records found for reactor 'unita'."));
    assert!(!output.contains("This reactor is"));
}

#[tokio::test]
async fn test_reactor_detail_empty_name_returns() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "2\n\n5\n").await;

    assert!(result.is_ok());
    assert!(!output.contains("No records found"));
    assert!(!output.contains("***"));
}

#[tokio::test]
async fn test_outages_in_range() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let input = "3\n2024\n1\n1\ny\n2024\n1\n31\ny\n5\n";
    let (result, output) = run_shell(&server, store, input).await;

    assert!(result.is_ok());
    assert!(output.contains("Enter the start date between 12/31/2023 and 02/21/2024"));
    assert!(output.contains("Enter the end date between 01/01/2024 and 02/21/2024"));
    assert!(output.contains("Reactors that are down between 01/01/2024 and 01/31/2024:"));
    assert!(output.contains("UnitB           Number of days down: 2"));
    assert!(!output.contains("UnitA           Number of days down"));
    assert!(!output.contains("UnitC           Number of days down"));
}

#[tokio::test]
async fn test_outages_empty_range() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let input = "3\n2024\n1\n10\ny\n2024\n1\n20\ny\n5\n";
    let (result, output) = run_shell(&server, store, input).await;

    assert!(result.is_ok());
    assert!(output.contains("No reactors were down in that range."));
}

#[tokio::test]
async fn test_date_entry_validation() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    // Year out of range, bad month, Feb 30 in a leap year, then re-entry
    let input = "3\n1999\n2024\n13\nfeb\n2\n30\n29\nmaybe\nn\n2024\n2\n1\ny\n2024\n2\n29\ny\n5\n";
    let (result, output) = run_shell(&server, store, input).await;

    assert!(result.is_ok());
    assert!(output.contains("Please input a year between 2023 and 2024."));
    assert!(output.contains("Please input a month between 1 and 12."));
    assert!(output.contains("Please enter a valid month."));
    assert!(output.contains("Day (1 - 29): "));
    assert!(output.contains("Please input a day between 1 and 29."));
    assert!(output.contains("Confirm Date of 2/29/2024: y or n"));
    assert!(output.contains("Invalid input. Please enter 'y' or 'n'."));
    assert!(output.contains("Reactors that are down between 02/01/2024 and 02/29/2024:"));
    assert!(output.contains("UnitC           Number of days down: 1"));
}

#[tokio::test]
async fn test_date_entry_abandoned() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "3\n2024\n\n5\n").await;

    assert!(result.is_ok());
    assert!(!output.contains("Reactors that are down between"));
    assert_eq!(output.matches("Welcome to the program:").count(), 2);
}

#[tokio::test]
async fn test_empty_confirmation_abandons() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store, "3\n2024\n1\n1\n\n5\n").await;

    assert!(result.is_ok());
    assert!(!output.contains("Enter the end date"));
}

#[tokio::test]
async fn test_outages_with_no_data() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::new());

    let (result, output) = run_shell(&server, store, "3\n5\n").await;

    assert!(result.is_ok());
    assert!(output.contains("No data available"));
}

#[tokio::test]
async fn test_refresh_replaces_history() {
    let server = mock_feed(200, FEED).await;
    let store = Arc::new(MemoryStatusStore::with_records(history()));

    let (result, output) = run_shell(&server, store.clone(), "4\n1\n5\n").await;

    assert!(result.is_ok());
    assert!(!output.contains("UnitC"));

    let dates: Vec<NaiveDate> = store
        .snapshot()
        .await
        .unwrap()
        .iter()
        .map(|r| r.report_date())
        .collect();
    assert!(dates.iter().all(|d| d.to_string() == "2024-01-02"));
}
