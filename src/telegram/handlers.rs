//! Telegram bot handler tree configuration
//!
//! The dispatcher maps each inbound text to the one matching response
//! handler. Every handler records the interaction through the best-effort
//! recorder and replies with its canned text; recording runs in a spawned
//! task so a slow or failing store can never delay the reply.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::core::config;
use crate::storage::record::{FieldUpdate, InteractionEvent, ProfileSnapshot};
use crate::storage::Recorder;
use crate::telegram::bot::Command;
use crate::telegram::menu::{self, MenuAction};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
///
/// The recorder is injected here rather than referenced as a global so the
/// handler tree can be wired against a test double.
#[derive(Clone)]
pub struct HandlerDeps {
    pub recorder: Arc<Recorder>,
}

impl HandlerDeps {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

/// Extracts the identity + display-name snapshot from a message.
pub fn snapshot_from(msg: &Message) -> ProfileSnapshot {
    ProfileSnapshot::new(
        msg.chat.id.0,
        msg.from.as_ref().map(|u| u.first_name.as_str()),
        msg.from.as_ref().and_then(|u| u.last_name.as_deref()),
        msg.from.as_ref().and_then(|u| u.username.as_deref()),
    )
}

/// Hands one interaction to the recorder without awaiting it. The reply path
/// must not block on persistence; outcomes surface through the recorder's
/// own logging.
fn record_in_background(
    recorder: &Arc<Recorder>,
    snapshot: ProfileSnapshot,
    update: Option<FieldUpdate>,
    event: InteractionEvent,
) {
    let recorder = Arc::clone(recorder);
    tokio::spawn(async move {
        recorder.record(&snapshot, update).await;
        recorder.log_event(&event).await;
    });
}

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same handler tree is used in production and in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_menu = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(menu_handler(deps_menu))
        .branch(fallback_handler())
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                match cmd {
                    Command::Start => handle_start(&bot, &msg, &deps).await?,
                    Command::Stats => handle_stats(&bot, &msg, &deps).await?,
                }
                Ok(())
            }
        })
}

fn menu_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.text().and_then(MenuAction::parse))
        .endpoint(move |bot: Bot, msg: Message, action: MenuAction| {
            let deps = deps.clone();
            async move {
                handle_menu_action(&bot, &msg, action, &deps).await?;
                Ok(())
            }
        })
}

/// Unmatched text is ignored by design; the original flows only ever react
/// to the fixed button labels.
fn fallback_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().endpoint(|msg: Message| async move {
        log::debug!("Ignoring unmatched message in chat {}", msg.chat.id);
        Ok(())
    })
}

async fn handle_start(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    record_in_background(
        &deps.recorder,
        snapshot_from(msg),
        None,
        InteractionEvent {
            user_id: msg.chat.id.0,
            message_text: "/start".to_string(),
            bot_response: "main menu".to_string(),
            interaction_type: "command".to_string(),
        },
    );

    bot.send_message(msg.chat.id, menu::WELCOME_TEXT)
        .reply_markup(menu::main_keyboard())
        .await?;
    Ok(())
}

async fn handle_menu_action(
    bot: &Bot,
    msg: &Message,
    action: MenuAction,
    deps: &HandlerDeps,
) -> ResponseResult<()> {
    let text = msg.text().unwrap_or_default().to_string();

    match action {
        MenuAction::Consultation => {
            record_button(deps, msg, &text, "challenge prompt");
            bot.send_message(msg.chat.id, menu::CHALLENGE_PROMPT)
                .reply_markup(menu::challenge_keyboard())
                .await?;
        }
        MenuAction::Challenge(option) => {
            record_in_background(
                &deps.recorder,
                snapshot_from(msg),
                Some(FieldUpdate::challenge_response(option.clone())),
                InteractionEvent {
                    user_id: msg.chat.id.0,
                    message_text: option,
                    bot_response: "consult pitch".to_string(),
                    interaction_type: "challenge".to_string(),
                },
            );

            bot.send_message(msg.chat.id, menu::CONSULT_PITCH)
                .reply_markup(menu::consult_link_keyboard())
                .await?;
            bot.send_message(msg.chat.id, menu::FOLLOWUP_TEXT)
                .reply_markup(menu::main_keyboard())
                .await?;
            bot.send_message(msg.chat.id, menu::RESOURCES_TEXT).await?;
        }
        MenuAction::Jobs => {
            record_button(deps, msg, &text, "whatsapp link");
            bot.send_message(msg.chat.id, menu::JOBS_TEXT)
                .reply_markup(menu::jobs_link_keyboard())
                .await?;
        }
        MenuAction::FreePdf => {
            record_button(deps, msg, &text, "pdf link");
            bot.send_message(msg.chat.id, menu::FREE_PDF_TEXT)
                .reply_markup(menu::pdf_link_keyboard())
                .await?;
        }
        MenuAction::ContactUs => {
            record_button(deps, msg, &text, "contact form link");
            bot.send_message(msg.chat.id, menu::CONTACT_US_TEXT)
                .reply_markup(menu::contact_link_keyboard())
                .await?;
        }
        MenuAction::AiChat => {
            record_button(deps, msg, &text, "ai chat teaser");
            bot.send_message(msg.chat.id, menu::AI_CHAT_TEXT)
                .reply_markup(menu::main_keyboard())
                .await?;
        }
        MenuAction::EndChat => {
            record_button(deps, msg, &text, "goodbye");
            bot.send_message(msg.chat.id, menu::END_CHAT_TEXT).await?;
        }
    }

    Ok(())
}

fn record_button(deps: &HandlerDeps, msg: &Message, button: &str, response: &str) {
    record_in_background(
        &deps.recorder,
        snapshot_from(msg),
        Some(FieldUpdate::clicked_button(button)),
        InteractionEvent {
            user_id: msg.chat.id.0,
            message_text: button.to_string(),
            bot_response: response.to_string(),
            interaction_type: "button".to_string(),
        },
    );
}

/// Admin-only: totals plus the caller's own record. Non-admins are ignored
/// silently, the same way hidden admin commands behave elsewhere.
async fn handle_stats(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> ResponseResult<()> {
    let user_id = msg.chat.id.0;
    if !config::admin::is_admin(user_id) {
        log::debug!("Ignoring /stats from non-admin user {}", user_id);
        return Ok(());
    }

    if !deps.recorder.is_enabled() {
        bot.send_message(msg.chat.id, "📊 Persistence is disabled; no stats available.")
            .await?;
        return Ok(());
    }

    let total = deps.recorder.total_interactions().await;
    let own = deps.recorder.user_stats(user_id).await;

    let mut lines = vec!["📊 Interaction stats".to_string()];
    match total {
        Some(total) => lines.push(format!("Total recorded interactions: {}", total)),
        None => lines.push("Total recorded interactions: unavailable".to_string()),
    }
    if let Some(stats) = own {
        lines.push(format!(
            "Your record: {} interaction(s), first {}, last {}, last button: {}",
            stats.interaction_count,
            stats.first_interaction,
            stats.last_interaction,
            stats.clicked_button
        ));
    }

    bot.send_message(msg.chat.id, lines.join("\n")).await?;
    Ok(())
}
