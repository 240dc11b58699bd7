use crate::calendar::VenueCalendar;
use crate::config::model::Config;
use crate::output::{save_calendar, OutputError};
use crate::venuzle::api::{APIError, VenuzleAPI};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] APIError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Fetches every configured day, then writes the calendar.
/// Nothing is written unless all days were fetched and parsed.
#[tracing::instrument(skip(config), fields(cluster = config.booking.cluster_id))]
pub async fn run(config: &Config, today: NaiveDate) -> Result<VenueCalendar, RunError> {
    let start_date = config.scrape.start_date_or(today);

    info!(
        "Fetching {} days from {} for cluster {}",
        config.scrape.days, start_date, config.booking.cluster_id
    );

    let api = VenuzleAPI::new(&config.booking)?;
    let days = api
        .get_days_availability(start_date, config.scrape.days, config.scrape.request_delay)
        .await?;

    let calendar = VenueCalendar::from_days(days);

    save_calendar(&calendar, &config.output_path)?;

    Ok(calendar)
}
