//! Command checks.

use crate::{bot::BotData, errors::Error};

/// Passes only for Discord users on the admin allowlist.
#[allow(clippy::unused_async)]
pub async fn is_admin(ctx: poise::Context<'_, BotData, Error>) -> Result<bool, Error> {
    let user_id = ctx.author().id.to_string();
    Ok(ctx.data().admin.is_discord_admin(&user_id))
}
