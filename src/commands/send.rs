use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Send a direct message to a user (operators only)
#[poise::command(slash_command)]
pub async fn send(
    ctx: Context<'_>,
    #[description = "Target user ID"] userid: String,
    #[description = "Message to deliver"] message: String,
) -> Result<(), Error> {
    let ack = match deliver(&ctx, &userid, &message).await {
        Ok(tag) => {
            info!("Operator {} sent a DM to {tag}", ctx.author().tag());
            format!("✅ Message delivered to {tag}.")
        }
        Err(err) => {
            warn!("Failed to deliver operator DM to {userid}: {err}");
            "❌ Could not deliver the message. Check the user ID and try again.".to_string()
        }
    };

    // Acknowledgment is visible to the invoking operator only.
    ctx.send(poise::CreateReply::default().content(ack).ephemeral(true))
        .await?;
    Ok(())
}

async fn deliver(ctx: &Context<'_>, userid: &str, message: &str) -> anyhow::Result<String> {
    let id: u64 = userid
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid user id {userid:?}"))?;
    if id == 0 {
        anyhow::bail!("invalid user id 0");
    }

    let user = serenity::UserId::new(id)
        .to_user(ctx.serenity_context())
        .await?;
    user.direct_message(
        ctx.serenity_context(),
        serenity::CreateMessage::new().content(message),
    )
    .await?;
    Ok(user.tag())
}
