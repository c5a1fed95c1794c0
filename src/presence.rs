use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::info;

const CYCLE_INTERVAL: Duration = Duration::from_secs(60);

const ACTIVITIES: [&str; 6] = [
    "Meditating on the mysteries of the universe",
    "Contemplating ancient wisdom",
    "Guiding seekers on their path",
    "Listening to the silence within",
    "Sharing insights from the cosmos",
    "Reflecting on the nature of reality",
];

/// Rotate the displayed activity once immediately and then every minute.
/// Purely cosmetic; runs detached from everything else.
pub fn spawn_cycler(ctx: serenity::Context) {
    tokio::spawn(async move {
        info!("Starting presence cycler");
        let mut interval = tokio::time::interval(CYCLE_INTERVAL);
        let mut index = 0usize;
        loop {
            interval.tick().await;
            ctx.set_presence(
                Some(serenity::ActivityData::playing(ACTIVITIES[index])),
                serenity::OnlineStatus::Online,
            );
            index = (index + 1) % ACTIVITIES.len();
        }
    });
}
