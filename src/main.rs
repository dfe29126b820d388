// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use medibot_server::app::{serve, MediBot};
use medibot_server::{AppState, Config};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medibot_server=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if !config.google_ai_configured() {
        warn!("GOOGLE_API_KEY is not set, image analysis will answer with an apology");
    }
    info!(
        "Starting MediBot API v2.0 (model: {}, label API: {})",
        config.gemini_model, config.openfda_label_url
    );

    let bot = MediBot::from_config(&config)?;
    let state = Arc::new(AppState { config, bot });

    serve(state).await?;
    Ok(())
}
