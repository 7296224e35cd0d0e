use clap::Parser;
use ledger_rollup::args::{Args, Command};
use ledger_rollup::{commands, Config, Error, ErrorType, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let config_path = args.common().config();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(config_path, init_args.force())
            .await?
            .print(),

        Command::Render(render_args) => {
            let overrides = render_args.overrides();
            let config = load_config(config_path)
                .await?
                .with_overrides(overrides.renumber(), overrides.malformed_amounts());
            commands::render(&config, render_args.input(), render_args.output())
                .await?
                .print()
        }

        Command::Group(group_args) => {
            let overrides = group_args.overrides();
            let config = load_config(config_path)
                .await?
                .with_overrides(overrides.renumber(), overrides.malformed_amounts());
            commands::group(
                &config,
                group_args.transactions(),
                group_args.output(),
                group_args.render(),
            )
            .await?
            .print()
        }
    };
    Ok(())
}

/// Loads the config file, or the defaults when there is none.
async fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::resolve(path)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
