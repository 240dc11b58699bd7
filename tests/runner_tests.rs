use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use venue_calendar::config::model::{BookingConfig, Config, ScrapeConfig};
use venue_calendar::output::load_calendar;
use venue_calendar::runner::{run, RunError};
use venue_calendar::venuzle::api::APIError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/day_20260209.html");
const PREVIOUS_RUN: &str = "{\n  \"calendar_grid\": {}\n}\n";

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
}

fn build_config(server: &MockServer, output_path: PathBuf) -> Config {
    Config {
        booking: BookingConfig {
            base_url: format!("{}/stadt-linz/venues", server.uri()),
            max_retries: 0,
            ..BookingConfig::default()
        },
        scrape: ScrapeConfig {
            start_date: None,
            days: 2,
            request_delay: Duration::ZERO,
        },
        output_path,
    }
}

async fn mount_day(server: &MockServer, date: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/stadt-linz/venues/c/6/{}/ajax/", date)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[test_log::test(tokio::test)]
async fn when_upstream_fails_should_leave_previous_output_untouched() {
    let server = MockServer::start().await;
    mount_day(&server, "20260209", 200, FIXTURE).await;
    mount_day(&server, "20260210", 500, "Internal Server Error").await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("venue_calendar.json");
    fs::write(&output, PREVIOUS_RUN).unwrap();

    let result = run(&build_config(&server, output.clone()), monday()).await;

    assert!(matches!(
        result,
        Err(RunError::Fetch(APIError::BadStatus { .. }))
    ));
    assert_eq!(fs::read_to_string(&output).unwrap(), PREVIOUS_RUN);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test_log::test(tokio::test)]
async fn should_start_today_and_write_every_day() {
    let server = MockServer::start().await;
    mount_day(&server, "20260209", 200, FIXTURE).await;
    mount_day(&server, "20260210", 200, FIXTURE).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("public").join("venue_calendar.json");

    let calendar = run(&build_config(&server, output.clone()), monday())
        .await
        .unwrap();

    assert_eq!(calendar.sorted_dates, vec!["20260209", "20260210"]);
    assert_eq!(load_calendar(&output).unwrap(), calendar);
}
