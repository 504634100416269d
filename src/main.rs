//! winrm-keywords binary entry point.

use std::process::ExitCode;

use tracing::info;
use winrm_keywords::api::{self, AppState};
use winrm_keywords::cli::{self, Args};
use winrm_keywords::config::Config;
use winrm_keywords::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'winrm-keywords --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args)?;

    logging::init_with_filter(config.log_filter())?;

    info!("winrm-keywords v{}", env!("CARGO_PKG_VERSION"));

    let server_config = config.to_server_config()?;
    let winrm_config = config.to_winrm_config()?;
    info!(
        transport = %winrm_config.transport,
        operation_timeout = winrm_config.operation_timeout.as_secs(),
        "WinRM client configured"
    );

    let state = AppState::from_config(winrm_config)?;
    api::serve_with_state(server_config, state).await?;

    Ok(())
}
