mod application;
pub mod data;
mod logging;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub(crate) use application::LoggingSnafu;
pub use logging::setup_tracing;
pub use runtime_config::RuntimeConfig;
