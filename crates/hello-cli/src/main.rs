use anyhow::{Context, Result};
use clap::Parser;
use hello_config::ConfigLoader;
use hello_ffi::InvokeError;
use std::process::ExitCode;

mod invoke;
mod logging;

/// Load the native `hello` library and call its `main` with "Bard".
///
/// The library is looked up in the directories listed in hello-bridge.toml,
/// then the current directory, then by the platform dynamic linker
/// (LD_LIBRARY_PATH, DYLD_LIBRARY_PATH or PATH).
///
/// ENVIRONMENT VARIABLES:
///     HELLO_BRIDGE_LIBRARY      Library name or path (default: hello)
///     HELLO_BRIDGE_SYMBOL       Exported function to call (default: main)
///     HELLO_BRIDGE_LOG_LEVEL    error, warn, info, debug or trace
///     HELLO_BRIDGE_LOG_FORMAT   auto, text or json
///     RUST_LOG                  Tracing filter, overrides the log level
#[derive(Parser)]
#[command(name = "hello-bridge")]
#[command(version)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err
                .downcast_ref::<InvokeError>()
                .map(InvokeError::kind)
                .unwrap_or("setup");
            let message = format!("{:#}", err);
            tracing::debug!(kind, error = %message, "hello-bridge failed");
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config = ConfigLoader::new()
        .load_from_directory(&cwd)
        .context("Failed to load configuration")?;

    logging::init_logging(config.log_level, config.log_format);
    if let Some(source) = &config.source {
        tracing::debug!(path = %source.display(), "loaded configuration file");
    }

    invoke::run(&config)
}
