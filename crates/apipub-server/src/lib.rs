pub mod config;
mod error;
mod handlers;
pub mod observability;
mod server;

pub use config::AppConfig;
pub use error::ApiError;
pub use server::{ApiServer, AppState, ServerBuilder, build_app};

pub use observability::{apply_logging_level, init_tracing, init_tracing_with_level};
