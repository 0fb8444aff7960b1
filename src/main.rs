// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use greenhouse::{
    api::{auth::create_account, router},
    auth::Role,
    config::{AppConfig, LogFormat, SeedAdmin, DEFAULT_LOG_FILTER},
    state::AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    if config.auth.using_fallback_secret {
        tracing::warn!(
            "JWT_SECRET is not set; signing session tokens with the built-in fallback secret"
        );
    }

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "Cannot bind");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(config.auth.clone());

    if let Some(seed) = &config.seed_admin {
        seed_admin(&state, seed).await;
    }

    let app = router(state);

    tracing::info!(%addr, "Greenhouse server listening (docs at /docs)");

    if let Err(e) = axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!(error = %e, "HTTP server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn seed_admin(state: &AppState, seed: &SeedAdmin) {
    match create_account(state, &seed.email, &seed.password, None, Role::Admin).await {
        Ok(record) => tracing::info!(user_id = %record.id, "Seeded admin account"),
        Err(e) => tracing::warn!(status = %e.status, error = %e.message, "Admin seeding skipped"),
    }
}
