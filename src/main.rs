use chrono::Local;
use std::env;
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info};
use venue_calendar::config::env_loader::load_config;
use venue_calendar::runner::run;
use venue_calendar::tracing::setup_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let loki = setup_tracing(env::var("LOKI_URL").ok().as_deref()).await;

    let result = scrape().await;

    if let Err(err) = &result {
        error!("Run failed, output left untouched: {}", err);
    }

    if let Some(loki) = loki {
        loki.shutdown().await;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn scrape() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    let calendar = run(&config, Local::now().date_naive()).await?;

    info!(
        "Date range {} - {}, {} days, {} unique times",
        calendar.start_date.as_deref().unwrap_or("-"),
        calendar.end_date.as_deref().unwrap_or("-"),
        calendar.total_days,
        calendar.sorted_times.len()
    );

    calendar.summary().iter().for_each(|day| {
        info!(
            "{}: {} slots, {} available, by status {:?}",
            day.day_name, day.listed_slots, day.available_slots, day.slots_by_status
        )
    });

    Ok(())
}
