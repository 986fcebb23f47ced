use std::fmt::Display;

use anyhow::{anyhow, Result};
use serenity::{
    client::Context,
    model::{channel::Channel, id::ChannelId},
};
use tokio::select;
use tracing_subscriber::EnvFilter;

pub(crate) fn setup_logs(crate_name: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("warn,{crate_name}=info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub(crate) fn exit_on_error<T, E: Display>(result: Result<T, E>, message: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!("{}: {}", message, e);
            std::process::exit(1)
        }
    }
}

pub(crate) async fn channel_name(ctx: &Context, id: ChannelId) -> Result<String> {
    if let Channel::Guild(channel) = id.to_channel(&ctx).await? {
        Ok(channel.name)
    } else {
        Err(anyhow!("Provided channel_id is not a GuildChannel"))
    }
}

#[cfg(windows)]
pub(super) async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");
    Ok(())
}

#[cfg(unix)]
pub(super) async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    select! {
        // Wait for SIGINT (which is sent on the first Ctrl+C)
        _ = interrupt.recv() => {
            info!("Received interrupt signal, shutting down...");
        }
        // Wait for SIGTERM
        _ = terminate.recv() => {
            info!("Received terminate signal, shutting down...");
        }
    };

    Ok(())
}
