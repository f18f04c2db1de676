//! venv-update CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use venv_update::cli::Cli;
use venv_update::config::Settings;
use venv_update::shell::install_interrupt_handler;
use venv_update::ui::Output;

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("venv_update=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("venv_update=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    install_interrupt_handler();

    tracing::debug!("venv-update starting with args: {:?}", cli);

    let output = Output::default();
    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::from(e.exit_code().clamp(1, 255) as u8);
        }
    };

    let code = venv_update::runner::run(&settings, &output);
    ExitCode::from(code.clamp(0, 255) as u8)
}
