// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use creator_dashboard_state::telemetry::init_tracing;
use creator_dashboard_state::{
    ClientConfig, Dashboard, DashboardMode, HttpGateway, SessionStore, SessionVault,
};
use tracing::error;

#[derive(Parser)]
#[command(name = "dashboard-cli", about = "Creator payout dashboard client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Sign in and persist the session.
    Login { email: String, password: String },
    /// Sign out and clear the persisted session.
    Logout,
    /// Wallet summary, payout estimate and recent activity.
    Overview,
    /// One page of the full transaction statement.
    Statement {
        #[arg(default_value_t = 1)]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "Command failed");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), String> {
    let config = ClientConfig::from_env();
    let vault = SessionVault::open(&config.vault_path()).map_err(|e| e.to_string())?;
    let gateway = Arc::new(HttpGateway::new(&config).map_err(|e| e.to_string())?);
    let store = SessionStore::new(gateway.clone(), vault);
    store.restore().await;

    let (mode, page) = match command {
        Command::Login { email, password } => {
            let profile = store
                .login(&email, &password)
                .await
                .map_err(|e| e.to_string())?;
            println!("Signed in as {} ({})", profile.slug, profile.id);
            store.settle().await;
            return Ok(());
        }
        Command::Logout => {
            store.logout().await;
            println!("Signed out");
            return Ok(());
        }
        Command::Overview => (DashboardMode::Overview, 1),
        Command::Statement { page } => (DashboardMode::Statement, page),
    };

    if !store.is_authenticated() {
        return Err("not signed in; run `dashboard-cli login` first".to_string());
    }
    let dashboard = Dashboard::new(gateway, &config, mode);
    dashboard.go_to_page(page).await;
    let rendered = serde_json::to_string_pretty(&dashboard.view()).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}
