use std::sync::Arc;

use certissue::api::{create_router, dto, AppState};
use certissue::{CertError, Cli, Commands, Config, IssueRequest, Result};
use clap::Parser;
use log::{error, info};
use serde::Serialize;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::from_settings(&cli.settings)?;
    let state = Arc::new(AppState::from_config(&config));

    match cli.command {
        Commands::Serve { bind } => {
            info!("Starting certissue v{} on {}", env!("CARGO_PKG_VERSION"), bind);
            info!("Certificates published under {}", config.public_base_url);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            axum::serve(listener, create_router(state)).await?;
        }

        Commands::Issue { id, name, grade } => {
            let outcome = state.issuance.issue(IssueRequest::new(id, name, grade)).await?;
            print_json(&dto::issued(outcome.url))?;
        }

        Commands::Verify { id } => match state.verification.verify(&id).await? {
            Some(found) => print_json(&dto::verified(found.record, found.url))?,
            None => {
                print_json(&dto::ApiResponse::<()>::failure(dto::INVALID_MESSAGE))?;
                return Err(CertError::NotFound(id));
            }
        },
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
