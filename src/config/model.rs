use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://book.venuzle.at/stadt-linz/venues";
pub const DEFAULT_CLUSTER_ID: u32 = 6;
pub const DEFAULT_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 366;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_OUTPUT_PATH: &str = "venue_calendar.json";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub booking: BookingConfig,
    pub scrape: ScrapeConfig,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub base_url: String,
    pub cluster_id: u32,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cluster_id: DEFAULT_CLUSTER_ID,
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// `None` means "today", resolved when the run starts
    pub start_date: Option<NaiveDate>,
    pub days: u32,
    pub request_delay: Duration,
}

impl ScrapeConfig {
    pub fn start_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid config '{name}'. Expected an integer number, got '{value}'")]
    NotANumber { name: String, value: String },
    #[error("Invalid config '{name}'. Must be at least {min}, got {value}")]
    TooSmall { name: String, min: u64, value: u64 },
    #[error("Invalid config '{name}'. Must be at most {max}, got {value}")]
    TooLarge { name: String, max: u64, value: u64 },
    #[error("Invalid config '{name}'. Expected a date as YYYYMMDD, got '{value}'")]
    InvalidDate { name: String, value: String },
    #[error("Invalid config '{name}'. Expected an http(s) URL, got '{value}'")]
    InvalidUrl { name: String, value: String },
}
