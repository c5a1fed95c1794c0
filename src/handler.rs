use crate::discord_text::{chunk_reply, strip_bot_mentions};
use crate::gate::{self, Origin};
use crate::providers::ProviderError;
use crate::{audit, Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// Orchestrates one inbound message end to end: gate, input extraction,
/// history trim, provider call, chunked reply, audit mirror.
pub async fn handle_message(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let origin = gate::classify(new_message, data.bot_id);
    if origin == Origin::Ignored {
        return Ok(());
    }

    info!(
        "Message received from {}: {}",
        new_message.author.tag(),
        new_message.content
    );

    let input = match origin {
        Origin::Mention => strip_bot_mentions(&new_message.content, data.bot_id),
        _ => new_message.content.clone(),
    };
    if origin == Origin::Mention && input.is_empty() {
        // Avoid noisy replies when someone only pings the bot.
        return Ok(());
    }

    if !gate::permit(ctx, new_message, data, origin).await? {
        return Ok(());
    }

    let typing = new_message.channel_id.start_typing(&ctx.http);

    let image_url = first_image_url(new_message);

    data.history.trim_if_needed();
    let snapshot = data.history.snapshot();

    let reply = match data
        .backend
        .respond(&input, &snapshot, image_url.as_deref())
        .await
    {
        Ok(text) => text,
        Err(err) => {
            error!("Provider error: {err}");
            drop(typing);
            // Exactly one canned reply; the failed exchange is not recorded.
            new_message.reply(&ctx.http, user_facing_error(&err)).await?;
            return Ok(());
        }
    };

    data.history.record(&input, &reply);

    drop(typing);
    for chunk in chunk_reply(&reply) {
        new_message.reply(&ctx.http, chunk).await?;
    }

    audit::mirror_exchange(
        ctx,
        data,
        new_message,
        origin == Origin::DirectMessage,
        &input,
        &reply,
    )
    .await;

    Ok(())
}

fn first_image_url(message: &serenity::Message) -> Option<String> {
    let attachment = message.attachments.first()?;
    let content_type = attachment.content_type.as_deref()?;
    content_type
        .starts_with("image/")
        .then(|| attachment.url.clone())
}

pub fn user_facing_error(err: &ProviderError) -> &'static str {
    match err {
        ProviderError::RateLimited(_) => {
            "⏳ I'm being rate limited. Please wait a moment and try again."
        }
        ProviderError::QuotaExhausted(_) => {
            "❌ Sorry, I've reached my usage limit. Please try again later."
        }
        ProviderError::Other(_) => {
            "❌ Sorry, I encountered an error while processing your message. Please try again."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_error_class_has_its_own_canned_reply() {
        let rate = user_facing_error(&ProviderError::RateLimited("429".into()));
        let quota = user_facing_error(&ProviderError::QuotaExhausted("402".into()));
        let other = user_facing_error(&ProviderError::Other("boom".into()));

        assert!(rate.contains("rate limited"));
        assert!(quota.contains("usage limit"));
        assert!(other.contains("error while processing"));
        assert_ne!(rate, quota);
        assert_ne!(quota, other);
    }
}
