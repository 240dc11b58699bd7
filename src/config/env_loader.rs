use crate::config::model::{
    BookingConfig, Config, ConfigError, ScrapeConfig, DEFAULT_BASE_URL, DEFAULT_CLUSTER_ID,
    DEFAULT_DAYS, DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_PATH, DEFAULT_REQUEST_DELAY,
    DEFAULT_REQUEST_TIMEOUT, MAX_DAYS, USER_AGENT,
};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DATE_FORMAT: &str = "%Y%m%d";

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|name| env::var(name).ok())
}

/// Builds the config from any variable lookup, every variable being optional
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = load_url_config(&lookup, "VENUZLE_BASE_URL", DEFAULT_BASE_URL)?;
    let cluster_id = load_u32_config(&lookup, "VENUZLE_CLUSTER_ID", DEFAULT_CLUSTER_ID, 0)?;
    let start_date = load_date_config(&lookup, "START_DATE")?;
    let days = load_u32_config(&lookup, "DAYS", DEFAULT_DAYS, 1)?;
    if days > MAX_DAYS {
        return Err(ConfigError::TooLarge {
            name: "DAYS".to_string(),
            max: MAX_DAYS.into(),
            value: days.into(),
        });
    }
    let request_delay_ms = load_u32_config(
        &lookup,
        "REQUEST_DELAY_MS",
        DEFAULT_REQUEST_DELAY.as_millis() as u32,
        0,
    )?;
    let timeout_secs = load_u32_config(
        &lookup,
        "REQUEST_TIMEOUT_SECS",
        DEFAULT_REQUEST_TIMEOUT.as_secs() as u32,
        1,
    )?;
    let max_retries = load_u32_config(&lookup, "MAX_RETRIES", DEFAULT_MAX_RETRIES, 0)?;
    let output_path = lookup("OUTPUT_PATH")
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    Ok(Config {
        booking: BookingConfig {
            base_url,
            cluster_id,
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(timeout_secs.into()),
            max_retries,
        },
        scrape: ScrapeConfig {
            start_date,
            days,
            request_delay: Duration::from_millis(request_delay_ms.into()),
        },
        output_path: PathBuf::from(output_path),
    })
}

fn load_u32_config<F>(lookup: &F, name: &str, default: u32, min: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::NotANumber {
                name: name.to_string(),
                value,
            })?,
        None => default,
    };

    if value < min {
        return Err(ConfigError::TooSmall {
            name: name.to_string(),
            min: min.into(),
            value: value.into(),
        });
    }

    Ok(value)
}

fn load_date_config<F>(lookup: &F, name: &str) -> Result<Option<NaiveDate>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| ConfigError::InvalidDate {
                name: name.to_string(),
                value,
            }),
        _ => Ok(None),
    }
}

fn load_url_config<F>(lookup: &F, name: &str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    let url = value.trim().trim_end_matches('/');

    if reqwest::Url::parse(url).is_err() || !url.starts_with("http") {
        return Err(ConfigError::InvalidUrl {
            name: name.to_string(),
            value,
        });
    }

    Ok(url.to_string())
}
