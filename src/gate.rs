use crate::config::Config;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::warn;

/// How an inbound message addresses the bot, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    DirectMessage,
    Mention,
    /// Not addressed to the bot (or sent by a bot): no decision, no reply.
    Ignored,
}

pub fn classify(message: &serenity::Message, bot_id: u64) -> Origin {
    if message.author.bot {
        return Origin::Ignored;
    }
    if message.guild_id.is_none() {
        return Origin::DirectMessage;
    }
    if message
        .mentions
        .iter()
        .any(|user| user.id.get() == bot_id)
    {
        return Origin::Mention;
    }
    Origin::Ignored
}

/// The whitelist only restricts anything when the feature is on AND at least
/// one guild is listed.
pub fn whitelist_active(config: &Config) -> bool {
    config.whitelist_enabled && !config.allowed_guild_ids.is_empty()
}

pub fn guild_allowed(config: &Config, guild_id: u64) -> bool {
    !whitelist_active(config) || config.allowed_guild_ids.contains(&guild_id)
}

/// Decide whether this message may proceed, replying with a rejection when it
/// may not. DMs always pass; mentions are checked against the guild whitelist
/// and a live membership lookup. A failed lookup counts as "not a member" and
/// is not retried.
pub async fn permit(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
    origin: Origin,
) -> Result<bool, Error> {
    if origin != Origin::Mention || !whitelist_active(&data.config) {
        return Ok(true);
    }
    let Some(guild_id) = message.guild_id else {
        return Ok(true);
    };

    if !guild_allowed(&data.config, guild_id.get()) {
        warn!("Message from unauthorized guild: {guild_id}");
        message
            .reply(
                &ctx.http,
                "❌ This server is not authorized. Please use this bot in an authorized server.",
            )
            .await?;
        return Ok(false);
    }

    if let Err(err) = guild_id.member(&ctx.http, message.author.id).await {
        warn!(
            "Member lookup failed for guild {guild_id} and user {}: {err}",
            message.author.id
        );
        message
            .reply(
                &ctx.http,
                "❌ You and I must both be in an authorized server to chat. Please join an authorized server and try again.",
            )
            .await?;
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    const BOT_ID: u64 = 4242;

    fn config(whitelist_enabled: bool, allowed: &[u64]) -> Config {
        Config {
            discord_token: "token".to_string(),
            provider: ProviderKind::Cohere,
            cohere_api_key: None,
            cohere_model: "command-r-plus".to_string(),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            max_tokens: 150,
            system_prompt: String::new(),
            whitelist_enabled,
            allowed_guild_ids: allowed.to_vec(),
            log_channel_id: None,
            ops_guild_id: None,
        }
    }

    fn guild_message(mentions_bot: bool) -> serenity::Message {
        let mut message = serenity::Message::default();
        message.guild_id = Some(serenity::GuildId::new(1));
        if mentions_bot {
            let mut bot = serenity::User::default();
            bot.id = serenity::UserId::new(BOT_ID);
            message.mentions.push(bot);
        }
        message
    }

    #[test]
    fn bot_authors_are_always_ignored() {
        let mut message = guild_message(true);
        message.author.bot = true;
        assert_eq!(classify(&message, BOT_ID), Origin::Ignored);

        let mut dm = serenity::Message::default();
        dm.author.bot = true;
        assert_eq!(classify(&dm, BOT_ID), Origin::Ignored);
    }

    #[test]
    fn guildless_messages_are_direct_messages() {
        let message = serenity::Message::default();
        assert_eq!(classify(&message, BOT_ID), Origin::DirectMessage);
    }

    #[test]
    fn guild_messages_require_a_bot_mention() {
        assert_eq!(classify(&guild_message(true), BOT_ID), Origin::Mention);
        assert_eq!(classify(&guild_message(false), BOT_ID), Origin::Ignored);
    }

    #[test]
    fn mentioning_someone_else_is_not_a_mention() {
        let mut message = serenity::Message::default();
        message.guild_id = Some(serenity::GuildId::new(1));
        let mut other = serenity::User::default();
        other.id = serenity::UserId::new(999);
        message.mentions.push(other);
        assert_eq!(classify(&message, BOT_ID), Origin::Ignored);
    }

    #[test]
    fn whitelist_disabled_allows_any_guild() {
        let config = config(false, &[111]);
        assert!(!whitelist_active(&config));
        assert!(guild_allowed(&config, 222));
    }

    #[test]
    fn empty_allow_list_disables_the_whitelist() {
        let config = config(true, &[]);
        assert!(!whitelist_active(&config));
        assert!(guild_allowed(&config, 222));
    }

    #[test]
    fn active_whitelist_checks_the_guild() {
        let config = config(true, &[111]);
        assert!(whitelist_active(&config));
        assert!(guild_allowed(&config, 111));
        assert!(!guild_allowed(&config, 222));
    }
}
