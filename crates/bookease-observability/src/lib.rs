//! BookEase Observability
//!
//! - Structured logging to the console and to daily-rolling files
//! - Prometheus metrics, served on a separate listener
//! - HTTP request logging and metrics middleware
//!
//! Metrics can be switched off at runtime with `OBSERVABILITY_ENABLED=false`.
//!
//! ```no_run
//! use bookease_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     let _guards = init_tracing().expect("logging");
//!     let _metrics = init_metrics();
//!     // ... application code ...
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use metrics_exporter_prometheus::PrometheusHandle;

pub use logging::{init_tracing, logging_middleware};
pub use metrics::{
    LoginFailure, init_metrics, is_observability_enabled, metrics_app, metrics_middleware,
    track_entity_deactivated, track_entity_registered, track_login_failure, track_login_success,
    track_token_validation, track_tokens_issued, track_tokens_revoked,
};
