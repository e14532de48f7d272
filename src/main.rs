// src/main.rs
use crate::config::{AppConfig, Transport};
use crate::connectors::console::ConsoleChannel;
use crate::connectors::okx::OkxClient;
use crate::connectors::telegram::TelegramClient;
use crate::connectors::traits::{ChatChannel, MessageStream};
use crate::core::dispatcher::{Dispatcher, DispatcherSettings};
use crate::core::engine::ConversationEngine;
use crate::core::retry::RetryPolicy;
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod connectors;
mod core;
mod error;
mod strategies;
mod types;
mod utils;

/// Console sessions all belong to this user.
const CONSOLE_USER: i64 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new().context("Failed to load configuration")?;

    // 2. Logging: stderr plus a daily file under log_dir
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "paper_trader.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paper_trader=info")),
        )
        .init();

    println!("========================================");
    println!("       PAPER TRADER - v0.1.0");
    println!("========================================");
    println!("Transport: {:?}", config.transport);
    println!("Capital:   {} USDT", config.starting_capital());
    println!(
        "Grid:      -{}% / +{}%",
        config.grid_drop_pct(),
        config.grid_rise_pct()
    );
    println!("========================================");

    // 3. Initialize Components
    let prices = OkxClient::new(
        config.okx.base_url.clone(),
        Duration::from_secs(config.okx.request_timeout_secs),
    )?;
    let dispatcher = Dispatcher::new(
        Arc::new(prices),
        DispatcherSettings {
            starting_capital: config.starting_capital(),
            retry: RetryPolicy {
                max_attempts: config.retry.max_attempts,
                delay: config.retry_delay(),
            },
            grid_drop_pct: config.grid_drop_pct(),
            grid_rise_pct: config.grid_rise_pct(),
        },
    );

    // 4. Create Channels and subscribe to the chat transport
    let (inbound_tx, inbound_rx) = mpsc::channel(100);

    let chat: Arc<dyn ChatChannel> = match config.transport {
        Transport::Telegram => {
            let mut client = TelegramClient::new(
                &config.telegram.api_url,
                &config.telegram.token,
                config.telegram.poll_timeout_secs,
            );
            let username = client.connect().await?;
            info!(bot = %username, "Connected to Telegram");
            client.subscribe_messages(inbound_tx).await?;
            Arc::new(client)
        }
        Transport::Console => {
            let mut console = ConsoleChannel::new(CONSOLE_USER);
            console.subscribe_messages(inbound_tx).await?;
            Arc::new(console)
        }
    };

    // 5. Run Engine
    let mut engine = ConversationEngine::new(dispatcher, chat, inbound_rx);

    if config.transport == Transport::Telegram {
        if let Some(admin_id) = config.telegram.admin_id {
            engine.notify_admin(admin_id).await;
        }
    }

    if let Err(e) = engine.run().await {
        error!("Fatal Engine Error: {}", e);
    }

    Ok(())
}
