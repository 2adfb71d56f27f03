//! Log output for the recall service.
//!
//! Development writes pretty multi-line events; production writes one JSON
//! object per event carrying the `request` span (request id, method, uri).

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::Environment;

/// Crates whose events follow the service level rather than the dependency level.
const SERVICE_TARGETS: [&str; 5] = ["serv", "prx_api", "prx_db", "prx_srs", "tower_http"];

/// Filter used when `RUST_LOG` is not set.
///
/// Service crates log at `debug` in development and `info` in production;
/// everything else is held to `info`/`warn`, and sqlx query logging stays at
/// `warn` in both.
pub fn default_filter(env: &Environment) -> String {
    let (service, dependencies) = if env.is_development() {
        ("debug", "info")
    } else {
        ("info", "warn")
    };

    let mut directives = vec![dependencies.to_string()];
    directives.extend(
        SERVICE_TARGETS
            .iter()
            .map(|target| format!("{target}={service}")),
    );
    directives.push("sqlx=warn".to_string());
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides [`default_filter`].
pub fn init_tracing(env: &Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let output: Box<dyn Layer<Registry> + Send + Sync> = if env.is_development() {
        fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed()
    } else {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(output.with_filter(env_filter))
        .init();

    tracing::info!(environment = ?env, "Tracing initialized");
}
