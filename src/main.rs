use bastet::commands::send;
use bastet::{config::Config, handler, history, presence, providers, Data};
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![send::send()],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        if let Err(err) = handler::handle_message(ctx, new_message, data).await {
                            error!("Error handling message: {err}");
                        }
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Logged in as {}", ready.user.tag());

                // The /send command is scoped to the operations guild; it is
                // not registered anywhere else.
                if let Some(guild_id) = config.ops_guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        serenity::GuildId::new(guild_id),
                    )
                    .await?;
                } else {
                    warn!("OPS_GUILD_ID not set; /send command not registered");
                }

                presence::spawn_cycler(ctx.clone());

                let backend = providers::LlmBackend::from_config(&config)?;
                Ok(Data {
                    bot_id: ready.user.id.get(),
                    config,
                    backend,
                    history: history::History::new(),
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to login to Discord: {}", e))?;

    Ok(())
}
