//! Fishbot entry point.
//!
//! Binary name: `fishbot`
//!
//! Boots the storefront bot: credentials from the environment, settings
//! from the data directory, one commerce token exchange, then a long-poll
//! loop that feeds every Telegram update through the dialogue dispatcher
//! until Ctrl+C or SIGTERM.

use anyhow::Context as _;
use tracing::info;

use fishbot_core::dispatch::Dispatcher;
use fishbot_core::engine::DialogueEngine;
use fishbot_infra::config::{self, Credentials};
use fishbot_infra::moltin::MoltinClient;
use fishbot_infra::sqlite::{DatabasePool, SqliteSessionStore};
use fishbot_infra::telegram::{TelegramBot, UpdatePoller};
use fishbot_observe::alert::{spawn_operator_forwarder, OperatorAlertLayer};
use fishbot_observe::tracing_setup::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local development keeps secrets in a .env file; in production the
    // variables come from the environment directly.
    dotenvy::dotenv().ok();

    let credentials = Credentials::from_env()?;

    // The alert layer is just a channel at this point; the forwarder that
    // drains it into the operator chat starts once the bot client exists.
    // Error events fired in between wait in the channel.
    let (alert_layer, alert_receiver) = OperatorAlertLayer::new();
    init_tracing(Some(alert_layer))?;

    let data_dir = config::data_dir();
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let settings = config::load_settings(&data_dir).await;

    let bot = TelegramBot::new(
        credentials.telegram_token,
        settings.telegram_api_base.clone(),
    );
    let _alert_forwarder =
        spawn_operator_forwarder(bot.clone(), credentials.operator_chat_id, alert_receiver);

    // Wrong commerce credentials must stop the process here, not surface
    // turn by turn once users start talking to the bot.
    let commerce = MoltinClient::authenticate(
        settings.commerce_api_base.clone(),
        &credentials.commerce_client_id,
        &credentials.commerce_client_secret,
    )
    .await
    .context("Commerce token exchange failed")?;

    let db_path = data_dir.join(&settings.database_file);
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = DatabasePool::new(&db_url)
        .await
        .with_context(|| format!("Failed to open session database {}", db_path.display()))?;
    let store = SqliteSessionStore::new(pool);

    let dispatcher = Dispatcher::new(DialogueEngine::new(commerce), store, bot.clone());
    let mut poller = UpdatePoller::new(bot, settings.poll_timeout_secs);

    info!("Fishbot is running");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping poll loop");
                break;
            }
            batch = poller.next_batch() => {
                // A signal during dispatch is picked up on the next
                // iteration, so shutdown always lands between batches.
                for update in &batch {
                    dispatcher.handle_update(update).await;
                }
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
