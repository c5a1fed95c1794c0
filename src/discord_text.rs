use crate::config::DISCORD_MESSAGE_LIMIT;

pub fn strip_bot_mentions(input: &str, bot_id: u64) -> String {
    let mention = format!("<@{}>", bot_id);
    let mention_nick = format!("<@!{}>", bot_id);

    input
        .replace(&mention, "")
        .replace(&mention_nick, "")
        .trim()
        .to_string()
}

/// Split a reply at fixed 2000-character boundaries (Discord's message
/// limit), preserving order. Counts characters rather than bytes so a chunk
/// never lands mid code point. Short (or empty) replies yield one chunk.
pub fn chunk_reply(text: &str) -> Vec<String> {
    if text.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return vec![text.to_string()];
    }

    text.chars()
        .collect::<Vec<char>>()
        .chunks(DISCORD_MESSAGE_LIMIT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
