use crate::calendar::VenueCalendar;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Invalid calendar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Couldn't write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes next to the target and renames over it, so readers never see a partial file
#[instrument(skip(calendar), fields(days = calendar.total_days))]
pub fn save_calendar(calendar: &VenueCalendar, path: &Path) -> Result<(), OutputError> {
    let mut json = serde_json::to_string_pretty(calendar)?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);

    debug!("Writing {} bytes to {}", json.len(), temp_path.display());

    fs::write(&temp_path, json)
        .and_then(|_| fs::rename(&temp_path, path))
        .map_err(|source| {
            let _ = fs::remove_file(&temp_path);

            OutputError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

    info!("Results saved to {}", path.display());

    Ok(())
}

pub fn load_calendar(path: &Path) -> Result<VenueCalendar, OutputError> {
    let json = fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_json::from_str(&json)?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(".tmp");

    path.with_file_name(file_name)
}
