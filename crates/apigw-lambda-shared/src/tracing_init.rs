//! Tracing initialization for Lambda functions.
//!
//! Configures JSON-formatted tracing output suitable for CloudWatch Logs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with JSON formatting for CloudWatch Logs.
///
/// This should be called once at the start of the Lambda `main` function,
/// before calling `lambda_runtime::run()`.
///
/// The log level can be controlled via the `RUST_LOG` environment variable.
/// Defaults to `info` if not set.
///
/// # Example
///
/// ```no_run
/// use apigw_lambda_shared::init_tracing;
///
/// init_tracing();
/// tracing::info!("cold start");
/// ```
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .flatten_event(true)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
