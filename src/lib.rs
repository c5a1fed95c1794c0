pub mod audit;
pub mod commands;
pub mod config;
pub mod discord_text;
pub mod gate;
pub mod handler;
pub mod history;
pub mod presence;
pub mod providers;

/// Custom data passed to all commands and event handlers
pub struct Data {
    pub config: config::Config,
    pub backend: providers::LlmBackend,
    /// One shared transcript for the whole process, every user and channel.
    pub history: history::History,
    /// Bot's own user ID for mention detection and stripping
    pub bot_id: u64,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
