use std::future::Future;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::errors::RagError;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DIVIDER: &str = "--------------------------------------------------";

pub fn init(config: &LoggingConfig) {
    let _ = std::fs::create_dir_all(&config.dir);

    let file_appender = tracing_appender::rolling::never(&config.dir, "ragline.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.filter));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Run one pipeline phase inside divider banners.
///
/// On failure the error is logged with the phase name before propagating;
/// there is no recovery at this level.
pub async fn phase<T, F>(name: &str, fut: F) -> Result<T, RagError>
where
    F: Future<Output = Result<T, RagError>>,
{
    tracing::info!("{}", DIVIDER);
    tracing::info!("STARTING {}", name);
    tracing::info!("{}", DIVIDER);

    match fut.await {
        Ok(value) => {
            tracing::info!("COMPLETED {}", name);
            tracing::info!("{}", DIVIDER);
            Ok(value)
        }
        Err(err) => {
            tracing::error!("ERROR in {}: {}", name, err);
            tracing::info!("{}", DIVIDER);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn phase_passes_the_value_through() {
        let value = phase("TEST PHASE", async { Ok::<_, RagError>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn phase_propagates_the_error() {
        let result: Result<(), _> = phase("FAILING PHASE", async {
            Err(RagError::Config("boom".to_string()))
        })
        .await;
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
