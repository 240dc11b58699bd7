use std::io;
use tokio::task::JoinHandle;
use tracing::{info, warn, Level};
use tracing_loki::url::Url;
use tracing_loki::{BackgroundTask, BackgroundTaskController};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter, fmt};

const SERVICE_NAME: &str = "venue-calendar";

/// Keeps Loki shipping alive until the run is over
pub struct LokiGuard {
    controller: BackgroundTaskController,
    handle: JoinHandle<()>,
}

impl LokiGuard {
    /// Flushes pending log lines before exit
    pub async fn shutdown(self) {
        self.controller.shutdown().await;

        if let Err(err) = self.handle.await {
            eprintln!("Loki background task failed: {}", err);
        }
    }
}

fn build_loki_layer(
    loki_url: &str,
) -> Result<(tracing_loki::Layer, BackgroundTaskController, BackgroundTask), String> {
    let base_url: Url = loki_url
        .parse()
        .map_err(|err| format!("invalid URL '{}': {}", loki_url, err))?;

    tracing_loki::builder()
        .label("service", SERVICE_NAME)
        .and_then(|builder| builder.build_controller_url(base_url))
        .map_err(|err| err.to_string())
}

/// Logs to stdout, and to Loki as well when `loki_url` answers
pub async fn setup_tracing(loki_url: Option<&str>) -> Option<LokiGuard> {
    let registry = tracing_subscriber::registry()
        .with(
            filter::Targets::new()
                .with_target("venue_calendar", Level::TRACE)
                .with_default(Level::WARN),
        )
        .with(fmt::layer().with_writer(io::stdout));

    let Some(loki_url) = loki_url else {
        registry.init();
        info!("No Loki URL, logging to stdout only");
        return None;
    };

    let loki = match build_loki_layer(loki_url) {
        Ok(loki) => loki,
        Err(err) => {
            registry.init();
            warn!("Couldn't set up Loki ({}). Continuing without it.", err);
            return None;
        }
    };

    if let Err(err) = reqwest::get(loki_url).await {
        registry.init();
        warn!("Loki unreachable ({}). Continuing without it.", err);
        return None;
    }

    let (layer, controller, task) = loki;
    registry.with(layer).init();
    let handle = tokio::spawn(task);

    info!("Shipping logs to Loki at {}", loki_url);

    Some(LokiGuard { controller, handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn should_build_loki_layer_for_a_valid_url() {
        assert!(build_loki_layer("http://127.0.0.1:3100").is_ok());
    }

    #[test_log::test]
    fn when_loki_url_is_malformed_should_refuse_it() {
        let err = build_loki_layer("not a url").err().unwrap();

        assert!(err.starts_with("invalid URL 'not a url'"));
    }
}
