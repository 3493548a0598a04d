use std::sync::Arc;

use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

mod bot;
mod config;
mod dates;
mod error;
mod import;
mod pontomais;
mod session;

use config::AppConfig;
use pontomais::PontoMaisClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load config before logging so DEBUG can pick the default level
    let config = AppConfig::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting PontoGo bot...");
    tracing::info!("Config loaded: {:?}", config);

    let hr = Arc::new(PontoMaisClient::new(&config));
    let state = Arc::new(bot::AppState::new(config.clone(), hr));

    // Create the Telegram bot
    let bot = Bot::new(&config.telegram_bot_token);

    let me = bot.get_me().await?;
    tracing::info!("Telegram bot authenticated as @{}", me.username());

    if let Err(e) = bot.set_my_commands(bot::menu_commands()).await {
        tracing::warn!("Failed to register command menu: {}", e);
    }

    // Build the dispatcher
    let handler = bot::build_handler();

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
