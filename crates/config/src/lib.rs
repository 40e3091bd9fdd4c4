//! Environment-driven settings and log setup for bugline services.

pub mod env;
pub mod tracing_init;

pub use env::AppConfig;
pub use tracing_init::{build_filter, init_tracing};
