#[macro_use]
extern crate tracing;

use std::sync::Arc;

use serenity::{client::ClientBuilder, prelude::GatewayIntents};
use tokio::select;

use crate::{
    commands::Dispatcher,
    config::Config,
    handler::Handler,
    registry::CaptureRegistry,
    relay::Relay,
    util::{exit_on_error, setup_logs, wait_for_signal},
};

mod commands;
mod config;
mod error;
mod handler;
mod registry;
mod relay;
mod util;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    setup_logs(env!("CARGO_PKG_NAME"));

    info!("Hello world, I am photobot");
    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }

    let config = exit_on_error(Config::from_env(), "Could not load configuration");
    info!("Relaying captured uploads to {}", config.storage.endpoint);

    let registry = Arc::new(CaptureRegistry::new());
    let handler = Handler::new(
        Dispatcher::new(registry.clone(), config.prefix, config.owner),
        Relay::new(registry, config.storage),
    );

    let mut discord_client = {
        let discord_client = ClientBuilder::new(
            config.discord_token,
            GatewayIntents::GUILDS
                | GatewayIntents::GUILD_MESSAGES
                | GatewayIntents::DIRECT_MESSAGES
                | GatewayIntents::MESSAGE_CONTENT,
        )
        .event_handler(handler)
        .await;
        exit_on_error(discord_client, "Could not create discord client")
    };

    info!("Setup complete. Starting bot...");
    select! {
        _ = wait_for_signal() => {},
        result = discord_client.start_autosharded() => {
            exit_on_error(result, "Discord client returned error");
        }
    }

    discord_client.shard_manager.shutdown_all().await
}
