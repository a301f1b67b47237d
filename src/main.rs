#![allow(clippy::enum_variant_names)]

use clap::Parser as _;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    application::{Application, ApplicationError, LoggingSnafu, RuntimeConfig, setup_tracing},
    cli::Cli,
};

mod application;
mod cli;
mod differ;
mod ext;
mod filesystem;
mod fingerprint;
mod reconciler;
mod scheduler;
mod sync_error;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let runtime_config = RuntimeConfig::from(Cli::parse());
    setup_tracing(&runtime_config).context(LoggingSnafu)?;
    debug!("Resolved runtime configuration: {runtime_config:?}");

    Application::run(runtime_config).await?;

    Ok(())
}
