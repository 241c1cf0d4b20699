//! Settings Discord commands - `/settings list|get|set`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::settings::{self, SettingKey},
        errors::{Error, Result},
    };
    use tracing::info;

    fn parse_key(raw: &str) -> Result<SettingKey> {
        SettingKey::parse(raw).ok_or_else(|| {
            let known: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
            Error::invalid("key", format!("Unknown setting. Known keys: {}", known.join(", ")))
        })
    }

    /// Parent command for store settings.
    #[poise::command(
        slash_command,
        subcommands("settings_list", "settings_get", "settings_set")
    )]
    pub async fn settings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Store settings command. Available subcommands:\n\
            `/settings list` - Show all settings\n\
            `/settings get` - Show one setting\n\
            `/settings set` - Change a setting";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows all stored settings.
    #[poise::command(slash_command, rename = "list")]
    pub async fn settings_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let stored = settings::list_settings(&ctx.data().database).await?;

        if stored.is_empty() {
            ctx.say("No settings are stored yet.").await?;
            return Ok(());
        }

        let lines: Vec<String> = stored
            .iter()
            .map(|s| format!("`{}` = **{}** (updated {})", s.key, s.value, s.updated_at.format("%Y-%m-%d")))
            .collect();
        ctx.say(format!("**Store settings**\n{}", lines.join("\n")))
            .await?;
        Ok(())
    }

    /// Shows one setting.
    #[poise::command(slash_command, rename = "get")]
    pub async fn settings_get(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Setting key"]
        #[autocomplete = "autocomplete::autocomplete_setting_key"]
        key: String,
    ) -> Result<()> {
        let key = parse_key(&key)?;
        let reply = match settings::get_setting(&ctx.data().database, key).await? {
            Some(value) => format!("`{}` = **{value}**", key.as_str()),
            None => format!("`{}` is not set.", key.as_str()),
        };
        ctx.say(reply).await?;
        Ok(())
    }

    /// Changes a setting.
    #[poise::command(slash_command, rename = "set")]
    pub async fn settings_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Setting key"]
        #[autocomplete = "autocomplete::autocomplete_setting_key"]
        key: String,
        #[description = "New value"] value: String,
    ) -> Result<()> {
        let key = parse_key(&key)?;
        let saved = settings::set_setting(&ctx.data().database, key, &value).await?;

        info!(key = %saved.key, admin = %ctx.author().name, "Setting changed from Discord");
        ctx.say(format!("✅ `{}` is now **{}**.", saved.key, saved.value))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
