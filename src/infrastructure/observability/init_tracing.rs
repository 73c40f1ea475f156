use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use super::TracingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// JSON output carries the current span chain, so request ids and chat stages
/// end up on every line; the text format stays compact for terminals.
pub fn init_tracing(config: &TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new(TracingConfig::FALLBACK_FILTER));

    let output: BoxedLayer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
    {
        eprintln!("tracing subscriber already installed: {e}");
        return;
    }

    tracing::info!(
        environment = %config.environment,
        json = config.json_format,
        filter = %config.filter,
        "Logging ready"
    );
}
