//! Feature catalog Discord command - `/features`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, render},
        core::features::{FeatureCatalog, FeatureQuery, FeatureStatus},
        errors::{Error, Result},
    };

    /// Lists back-office tools, grouped by area.
    #[poise::command(slash_command)]
    pub async fn features(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name or description"] search: Option<String>,
        #[description = "Feature group"]
        #[autocomplete = "autocomplete::autocomplete_feature_group"]
        group: Option<String>,
        #[description = "active, coming-soon, beta or deprecated"]
        #[autocomplete = "autocomplete::autocomplete_feature_status"]
        status: Option<String>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let status = status
            .as_deref()
            .map(|raw| {
                FeatureStatus::parse(raw).ok_or_else(|| {
                    Error::invalid("status", "Status is active, coming-soon, beta or deprecated")
                })
            })
            .transpose()?;

        let catalog = FeatureCatalog::load()?;
        let query = FeatureQuery {
            search: search.unwrap_or_default(),
            group,
            status,
            pagination: Some(ctx.data().pagination(page)),
            ..FeatureQuery::default()
        };
        let result = catalog.list(&query)?;

        let message = render::page_message(
            "Back-office features",
            &result,
            "No features match your filters.",
            render::feature_line,
        );
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
