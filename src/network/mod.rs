//! Network module.
//!
//! Owns the gateway client: builds it, wires the event bridge to the shared
//! state, runs the sweeper alongside it, and tears everything down on
//! shutdown.

mod events;

use crate::config::BotConfig;
use crate::gateway::DiscordGateway;
use crate::handlers::Dispatcher;
use crate::lifecycle::spawn_sweeper;
use crate::state::Switchboard;
use anyhow::Context as _;
use events::EventBridge;
use serenity::all::{Client, GatewayIntents};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use tracing::info;

/// Events the daemon needs: guild channels, chat commands, voice presence.
fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Connect and serve until the gateway closes or shutdown is signalled.
///
/// Fails fast if the token is rejected.
pub async fn run(
    token: &str,
    config: Arc<BotConfig>,
    shutdown_tx: broadcast::Sender<()>,
) -> anyhow::Result<()> {
    let slot = Arc::new(OnceLock::new());
    let dispatcher = Arc::new(Dispatcher::new());
    let bridge = EventBridge::new(slot.clone(), dispatcher.clone());

    let mut client = Client::builder(token.trim(), intents())
        .event_handler(bridge)
        .await
        .context("failed to build gateway client")?;

    let gateway = DiscordGateway::new(client.http.clone(), client.cache.clone());
    let bot_user = gateway
        .current_user()
        .await
        .context("failed to authenticate, check bot_settings.token")?;
    info!(user = %bot_user, "Authenticated");

    let sb = Arc::new(Switchboard::new(Arc::new(gateway), config));
    sb.set_bot_user(bot_user);
    let _ = slot.set(sb.clone());

    let sweeper = spawn_sweeper(sb.clone(), shutdown_tx.subscribe());

    // Stop the shards once anyone signals shutdown.
    let shard_manager = client.shard_manager.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let _ = shutdown_rx.recv().await;
        shard_manager.shutdown_all().await;
    });

    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = signal_tx.send(());
        }
    });

    let result = client.start().await;

    let _ = shutdown_tx.send(());
    let _ = sweeper.await;
    for record in sb.registry.snapshot() {
        info!(
            channel = %record.channel_id,
            owner = %record.owner_id,
            name = %record.display_name,
            "Channel left behind at shutdown"
        );
    }
    info!(
        commands = ?dispatcher.command_stats(),
        channels = sb.registry.len(),
        "pvoiced stopped"
    );

    result.context("gateway connection failed")
}
