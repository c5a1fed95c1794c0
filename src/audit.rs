use crate::Data;
use poise::serenity_prelude as serenity;
use tracing::error;

/// Discord embed field values are capped at 1024 characters.
const EMBED_FIELD_LIMIT: usize = 1024;

/// Best-effort mirror of one exchange into the configured log channel. Never
/// surfaces a failure to the user; the reply has already been delivered.
pub async fn mirror_exchange(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
    is_dm: bool,
    question: &str,
    answer: &str,
) {
    let Some(channel_id) = data.config.log_channel_id else {
        return;
    };
    if let Err(err) = send_record(
        ctx,
        serenity::ChannelId::new(channel_id),
        message,
        is_dm,
        question,
        answer,
    )
    .await
    {
        error!("Failed to send conversation log: {err}");
    }
}

async fn send_record(
    ctx: &serenity::Context,
    log_channel: serenity::ChannelId,
    message: &serenity::Message,
    is_dm: bool,
    question: &str,
    answer: &str,
) -> Result<(), serenity::Error> {
    let channel = if is_dm {
        "Direct Message".to_string()
    } else {
        message
            .channel_id
            .name(ctx)
            .await
            .unwrap_or_else(|_| message.channel_id.to_string())
    };

    let embed = serenity::CreateEmbed::new()
        .title("Conversation Log")
        .field(
            "User",
            format!("{} ({})", message.author.tag(), message.author.id),
            true,
        )
        .field("Channel", channel, true)
        .field("Question", clip(question), false)
        .field("Answer", clip(answer), false)
        .timestamp(serenity::Timestamp::now());

    log_channel
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

fn clip(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "(empty)".to_string();
    }
    if text.chars().count() <= EMBED_FIELD_LIMIT {
        return text.to_string();
    }
    text.chars().take(EMBED_FIELD_LIMIT - 1).chain(['…']).collect()
}
