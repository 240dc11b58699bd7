use super::dto::{ParseError, TimetableResponse};
use super::model::{compact_date, DayAvailability};
use crate::config::model::BookingConfig;
use chrono::{Days, NaiveDate};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub struct VenuzleAPI {
    client: ClientWithMiddleware,
    base_url: String,
    cluster_id: u32,
}

impl VenuzleAPI {
    pub fn new(config: &BookingConfig) -> Result<Self, APIError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(APIError::ClientSetup)?;

        Ok(Self {
            client: ClientBuilder::new(client)
                .with(RetryTransientMiddleware::new_with_policy(
                    ExponentialBackoff::builder().build_with_max_retries(config.max_retries),
                ))
                .build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cluster_id: config.cluster_id,
        })
    }

    /// The AJAX endpoint listing every venue of the cluster on `date`
    pub fn day_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/c/{}/{}/ajax/",
            self.base_url,
            self.cluster_id,
            compact_date::format(&date)
        )
    }

    #[tracing::instrument(skip(self), fields(date = %compact_date::format(&date)))]
    pub async fn get_day_availability(&self, date: NaiveDate) -> Result<DayAvailability, APIError> {
        let url = self.day_url(date);

        info!("Fetching {}", url);

        let html = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| APIError::RequestFailed {
                url: url.clone(),
                source,
            })?
            .error_for_status()
            .map_err(|source| APIError::BadStatus {
                url: url.clone(),
                source,
            })?
            .text()
            .await
            .map_err(|source| APIError::ReadBody {
                url: url.clone(),
                source,
            })?;

        let response = TimetableResponse::parse(&html).map_err(|source| {
            error!("Response parse failed: {:?}", source);
            APIError::InvalidResponse {
                url: url.clone(),
                source,
            }
        })?;
        let day = response.to_model(date, url);

        info!(
            "Found {} venue rows, {} venues, {} with availability",
            day.total_venues, day.venues_with_slots, day.venues_with_available_slots
        );

        Ok(day)
    }

    /**
    Fetches `days` consecutive days, one request at a time
    * delay: pause between two requests
    */
    #[tracing::instrument(skip(self, delay), fields(start = %compact_date::format(&start)))]
    pub async fn get_days_availability(
        &self,
        start: NaiveDate,
        days: u32,
        delay: Duration,
    ) -> Result<Vec<DayAvailability>, APIError> {
        info!("Fetching {} days", days);

        let mut all_days = Vec::new();

        for offset in 0..days {
            let date = start
                .checked_add_days(Days::new(offset.into()))
                .ok_or(APIError::DateOutOfRange { start, offset })?;

            if offset > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            all_days.push(self.get_day_availability(date).await?);
        }

        Ok(all_days)
    }
}

#[derive(Debug, Error)]
pub enum APIError {
    #[error("Couldn't build HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("Request to {url} was rejected: {source}")]
    BadStatus {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Couldn't read response body from {url}: {source}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: ParseError,
    },
    #[error("Day {offset} after {start} is out of range")]
    DateOutOfRange { start: NaiveDate, offset: u32 },
}
