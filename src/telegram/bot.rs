//! Bot instance creation and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "interaction statistics (admins only)")]
    Stats,
}

/// Creates the Bot instance from the configured token.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Token absent or HTTP client construction failed
///
/// A missing token is the one fatal configuration error: without it the
/// process has nothing to do, so startup aborts here.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        anyhow::bail!("TELEGRAM_TOKEN (or TELOXIDE_TOKEN) is not set; aborting");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(token, client))
}

/// Registers the user-visible command list in the Telegram UI.
/// `/stats` is deliberately left out; it is admin-only.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![BotCommand::new("start", "show the main menu")])
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_descriptions_cover_both_commands() {
        let commands = Command::descriptions();
        let command_list = format!("{}", commands);

        assert!(command_list.contains("I can"));
        assert!(command_list.contains("start"));
        assert!(command_list.contains("stats"));
    }
}
