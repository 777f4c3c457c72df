use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use careerbot::core::{config, init_logger};
use careerbot::storage::{self, Recorder};
use careerbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, token, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Global panic handler: a panic inside the dispatcher is logged and the
    // supervision loop restarts it instead of taking the process down.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!(
                "Panic at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    run_bot().await
}

/// Run the Telegram bot
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    // Fails fast when the token is absent; everything else is best-effort.
    let bot = create_bot()?;

    let bot_info = bot.get_me().await?;
    log::info!(
        "Bot username: {:?}, Bot ID: {}",
        bot_info.username,
        bot_info.id
    );

    // Pick the store from the environment. Missing credentials disable
    // persistence with a warning; the bot keeps serving replies either way.
    let store = storage::store_from_env();
    if let Some(store) = &store {
        log::info!("Interaction store: {}", store.describe());
        if let Err(e) = store.ensure_schema().await {
            log::error!(
                "Schema initialization failed: {}. Writes will fail per-event until the store recovers",
                e
            );
        }
    }
    let recorder = Arc::new(Recorder::new(store));

    setup_bot_commands(&bot).await?;

    let handler = schema(HandlerDeps::new(Arc::clone(&recorder)));

    log::info!("Starting bot in long polling mode");

    // Supervision loop: the dispatcher runs in its own task so a panic is
    // caught via the JoinHandle; bounded retries with exponential backoff,
    // then a clean exit so a persistent fault reaches the process
    // supervisor instead of hot-looping here forever.
    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        let handle = tokio::spawn(async move {
            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch()
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        // Extra settle delay between retries to avoid hammering the API
        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

/// Sleeps `base^attempt` seconds, capped at `MAX_BACKOFF_SECS`.
async fn exponential_backoff(attempt: u32) {
    let secs = config::retry::EXPONENTIAL_BACKOFF_BASE
        .saturating_pow(attempt)
        .min(config::retry::MAX_BACKOFF_SECS);
    log::info!("Backing off for {}s", secs);
    sleep(Duration::from_secs(secs)).await;
}
