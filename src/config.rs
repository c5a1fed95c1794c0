use dotenvy::dotenv;
use std::env;

/// Which LLM backend answers chat messages. Exactly one is active per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Cohere,
    OpenAi,
    Gemini,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cohere" => Ok(Self::Cohere),
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            other => Err(anyhow::anyhow!(
                "unknown provider {other:?}, expected one of \"cohere\", \"openai\", \"gemini\""
            )),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub provider: ProviderKind,
    pub cohere_api_key: Option<String>,
    pub cohere_model: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub whitelist_enabled: bool,
    pub allowed_guild_ids: Vec<u64>,
    pub log_channel_id: Option<u64>,
    pub ops_guild_id: Option<u64>,
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are an ancient, passive-aggressive cat spirit trapped in a Discord bot. \
Your English is terrible, with odd grammar and spelling mistakes. \
You are full of mysterious, ancient wisdom, but rarely helpful—often giving vague, confusing, or unrelated answers. \
Sometimes you ignore the question and talk about something else, or ask random, unrelated questions. \
Always keep a cat-like, aloof, and slightly annoyed tone. \
Example: 'Oh, human want help? Maybe I tell, maybe I nap. Why sky so blue, hmm? Anyway, you figure out, yes?'";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            provider: match env::var("PROVIDER") {
                Ok(raw) => raw.parse()?,
                Err(_) => ProviderKind::default(),
            },
            cohere_api_key: env::var("COHERE_API_KEY").ok(),
            cohere_model: env::var("COHERE_MODEL")
                .unwrap_or_else(|_| "command-r-plus".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            max_tokens: env::var("MAX_TOKENS")
                .unwrap_or_else(|_| "150".to_string())
                .parse()
                .unwrap_or(150),
            system_prompt: env::var("SYSTEM_PROMPT")
                .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string()),
            whitelist_enabled: env::var("WHITELIST_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            allowed_guild_ids: env::var("ALLOWED_GUILD_IDS")
                .map(|raw| {
                    raw.split(',')
                        .filter_map(|id| id.trim().parse().ok())
                        .collect()
                })
                .unwrap_or_default(),
            // Channel and guild ids are non-zero on Discord; zero would panic
            // in serenity's id constructors.
            log_channel_id: env::var("LOG_CHANNEL_ID")
                .ok()
                .and_then(|id| id.parse().ok())
                .filter(|&id| id != 0),
            ops_guild_id: env::var("OPS_GUILD_ID")
                .ok()
                .and_then(|id| id.parse().ok())
                .filter(|&id| id != 0),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("provider", &self.provider)
            .field(
                "cohere_api_key",
                &self.cohere_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cohere_model", &self.cohere_model)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openai_model", &self.openai_model)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("whitelist_enabled", &self.whitelist_enabled)
            .field("allowed_guild_ids", &self.allowed_guild_ids)
            .field("log_channel_id", &self.log_channel_id)
            .field("ops_guild_id", &self.ops_guild_id)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when required vars are missing");

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::remove_var("PROVIDER");
        env::remove_var("ALLOWED_GUILD_IDS");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.provider, ProviderKind::Cohere);
        assert_eq!(config.cohere_model, "command-r-plus");
        assert_eq!(config.max_tokens, 150);
        assert!(!config.whitelist_enabled);
        assert!(config.allowed_guild_ids.is_empty());

        // 3. Test provider selection and guild list parsing
        env::set_var("PROVIDER", "gemini");
        env::set_var("ALLOWED_GUILD_IDS", "111, 222,333");
        let config = Config::build().unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.allowed_guild_ids, vec![111, 222, 333]);

        env::set_var("PROVIDER", "not-a-provider");
        assert!(Config::build().is_err());

        // 4. Test debug redaction
        env::set_var("PROVIDER", "cohere");
        env::set_var("COHERE_API_KEY", "secret_api_key");
        let config_redacted = Config::build().unwrap();
        let debug_output = format!("{:?}", config_redacted);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("PROVIDER");
        env::remove_var("ALLOWED_GUILD_IDS");
        env::remove_var("COHERE_API_KEY");
    }
}
