//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are filtered case-insensitively on the user's partial input and capped
//! at Discord's limit of 25 choices.

use crate::{
    bot::BotData,
    core::{
        catalog,
        features::{FeatureCatalog, FeatureStatus},
        settings::SettingKey,
    },
    entities::ecu_file::{FileCategory, FileStatus},
    errors::Error,
};

const DISCORD_CHOICE_LIMIT: usize = 25;

/// Keeps the candidates containing `partial`, in their original order.
#[must_use]
pub fn matching<I, S>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let partial_lower = partial.trim().to_lowercase();
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|name: &String| name.to_lowercase().contains(&partial_lower))
        .take(DISCORD_CHOICE_LIMIT)
        .collect()
}

/// Suggests token package names.
pub async fn autocomplete_package_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(packages) = catalog::list_packages(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(packages.into_iter().map(|p| p.name), partial)
}

/// Suggests service keys.
pub async fn autocomplete_service_key(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(services) = catalog::list_services(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(services.into_iter().map(|s| s.key), partial)
}

/// Suggests file categories.
#[allow(clippy::unused_async)]
pub async fn autocomplete_file_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(FileCategory::ALL.iter().map(|c| c.as_str()), partial)
}

/// Suggests file statuses.
#[allow(clippy::unused_async)]
pub async fn autocomplete_file_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let statuses = [
        FileStatus::Pending,
        FileStatus::Active,
        FileStatus::Rejected,
        FileStatus::Archived,
    ];
    matching(statuses.iter().map(|s| s.as_str()), partial)
}

/// Suggests setting keys.
#[allow(clippy::unused_async)]
pub async fn autocomplete_setting_key(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(SettingKey::ALL.iter().map(|k| k.as_str()), partial)
}

/// Suggests feature group ids.
#[allow(clippy::unused_async)]
pub async fn autocomplete_feature_group(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(catalog) = FeatureCatalog::load() else {
        return Vec::new();
    };
    matching(catalog.groups.into_iter().map(|g| g.id), partial)
}

/// Suggests feature statuses.
#[allow(clippy::unused_async)]
pub async fn autocomplete_feature_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(FeatureStatus::ALL.iter().map(|s| s.as_str()), partial)
}
