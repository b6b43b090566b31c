//! Fetch → extract → report tests against a local mock receipt server

use std::fs;
use tempfile::tempdir;
use trascan::scan::{run_scan, ScanArgs};
use trascan::{scan, ErrorStyle, Outcome, ScanConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn receipt_page(name: &str, vrn: &str, no: &str, date: &str, total: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>TRA - Verify Receipt</title></head>
  <body>
    <div class="receipt">
      <center><h4><b>{name}</b></h4></center>

      <b>VRN:</b> {vrn}
      <b>RECEIPT NO:</b> {no}
      <b>RECEIPT DATE:</b> {date}
      <table>
        <tr>
          <td><b>TOTAL INCL OF TAX:</b></td>
          <td class="text-right">{total}</td>
        </tr>
      </table>
    </div>
  </body>
</html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> ScanConfig {
    ScanConfig {
        host: server.address().to_string(),
        ..ScanConfig::default()
    }
}

#[tokio::test]
async fn test_round_trip_csv_and_errors() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r1",
        200,
        receipt_page("ACME", "123-456", "R1", "2021-01-01", "1000.00"),
    )
    .await;

    let dir = tempdir().unwrap();
    let input = dir.path().join("links.txt");
    fs::write(&input, format!("{}/r1\nnot a receipt\n", server.uri())).unwrap();

    run_scan(ScanArgs {
        input: input.clone(),
        output: dir.path().to_path_buf(),
        host: server.address().to_string(),
        timeout: Some(5000),
        keep_blank: false,
        inline_errors: false,
    })
    .await
    .unwrap();

    let csv = fs::read_to_string(dir.path().join("Results-links.txt.csv")).unwrap();
    assert_eq!(
        csv,
        "COMPANY,VRN,RECEIPT,DATE,TOTAL\nACME,123-456,R1,2021-01-01,1000.00"
    );

    let errors = fs::read_to_string(dir.path().join("Errors-links.txt")).unwrap();
    assert_eq!(errors, "Error for 'not a receipt':\nNot a valid TRA receipt URL\n");
}

#[tokio::test]
async fn test_inline_errors_follow_input_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r1",
        200,
        receipt_page("ACME", "123-456", "R1", "2021-01-01", "1000.00"),
    )
    .await;
    mount_page(
        &server,
        "/missing",
        200,
        "<html><body>Receipt not found</body></html>".to_string(),
    )
    .await;

    let dir = tempdir().unwrap();
    let input = dir.path().join("links.txt");
    let base = server.uri();
    fs::write(&input, format!("{base}/r1\nhello\n{base}/missing\n")).unwrap();

    run_scan(ScanArgs {
        input: input.clone(),
        output: dir.path().to_path_buf(),
        host: server.address().to_string(),
        timeout: Some(5000),
        keep_blank: false,
        inline_errors: true,
    })
    .await
    .unwrap();

    let csv = fs::read_to_string(dir.path().join("Results-links.txt.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "ACME,123-456,R1,2021-01-01,1000.00");
    assert_eq!(lines[2], "\"ERROR: hello: Not a valid TRA receipt URL\",,,,");
    assert!(lines[3].starts_with(&format!("\"ERROR: {base}/missing: Failed to extract all data indices")));
    assert!(!dir.path().join("Errors-links.txt").exists());
}

#[tokio::test]
async fn test_error_log_lists_invalid_lines_first() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/missing",
        200,
        "<html><body>Receipt not found</body></html>".to_string(),
    )
    .await;

    let base = server.uri();
    let input = format!("{base}/missing\nhello\n");
    let report = scan(&input, &config_for(&server)).await.unwrap();

    let sources: Vec<&str> = report.failures().map(|(source, _)| source).collect();
    let missing = format!("{base}/missing");
    assert_eq!(sources, vec!["hello", missing.as_str()]);
    assert!(report
        .render_errors()
        .starts_with("Error for 'hello':\nNot a valid TRA receipt URL\n"));
}

#[tokio::test]
async fn test_failures_do_not_abort_batch() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/good1",
        200,
        receipt_page("ALPHA LTD", "10-000001-A", "A1", "2023-02-01", "5,000.00"),
    )
    .await;
    mount_page(
        &server,
        "/broken",
        200,
        "<html><body>Receipt not found</body></html>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/good2",
        200,
        receipt_page("BETA LTD", "10-000002-B", "B2", "2023-02-02", "7,500.00"),
    )
    .await;

    let base = server.uri();
    let input = format!("{base}/good1\n{base}/broken\n{base}/good2\n");
    let report = scan(&input, &config_for(&server)).await.unwrap();

    assert_eq!(report.ok_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].0, format!("{base}/broken"));
    assert!(failures[0].1.contains("receipt number index is -1"));

    assert_eq!(
        report.render_csv(ErrorStyle::Separate),
        "COMPANY,VRN,RECEIPT,DATE,TOTAL\n\
         ALPHA LTD,10-000001-A,A1,2023-02-01,5,000.00\n\
         BETA LTD,10-000002-B,B2,2023-02-02,7,500.00"
    );
}

#[tokio::test]
async fn test_status_code_is_not_inspected() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r404",
        404,
        receipt_page("ACME", "123-456", "R1", "2021-01-01", "1000.00"),
    )
    .await;

    let input = format!("{}/r404", server.uri());
    let report = scan(&input, &config_for(&server)).await.unwrap();

    assert_eq!(report.ok_count(), 1);
    assert_eq!(report.failed_count(), 0);
}

#[tokio::test]
async fn test_query_string_is_dropped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r1",
        200,
        receipt_page("ACME", "123-456", "R1", "2021-01-01", "1000.00"),
    )
    .await;

    let input = format!("{}/r1?secret=abc#top", server.uri());
    let report = scan(&input, &config_for(&server)).await.unwrap();
    assert_eq!(report.ok_count(), 1);

    // The report keeps the URL as given; only the request drops the query
    match &report.outcomes()[0] {
        Outcome::Success { url, .. } => assert!(url.ends_with("?secret=abc#top")),
        other => panic!("unexpected outcome: {:?}", other),
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_connection_failure_is_recorded() {
    let config = ScanConfig {
        host: "127.0.0.1:1".to_string(),
        timeout_ms: Some(2000),
        ..ScanConfig::default()
    };

    let report = scan("http://127.0.0.1:1/r1", &config).await.unwrap();

    assert_eq!(report.ok_count(), 0);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "http://127.0.0.1:1/r1");
    assert!(failures[0].1.starts_with("Request to http://127.0.0.1:1/r1 failed"));
}
