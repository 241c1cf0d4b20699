//! ECU file Discord commands - `/files list|approve|reject|archive|delete|stats`.
//!
//! Admins see every status here, unlike the public catalog which only lists active
//! files. Review actions follow the file workflow, so approving an archived file is
//! refused with the workflow error.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, render},
        core::{
            collection::{SortDirection, SortSpec},
            ecu_file::{self, FileAction, FileField, FileQuery},
            report,
        },
        entities::ecu_file::{FileCategory, FileStatus},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::warn;

    /// Parent command for the admin files screen.
    #[poise::command(
        slash_command,
        subcommands(
            "files_list",
            "files_approve",
            "files_reject",
            "files_archive",
            "files_delete",
            "files_stats"
        )
    )]
    pub async fn files(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "ECU file moderation command. Available subcommands:\n\
            `/files list` - Browse files of any status\n\
            `/files approve` - Publish a pending file\n\
            `/files reject` - Reject a pending file\n\
            `/files archive` - Archive a file\n\
            `/files delete` - Delete a file\n\
            `/files stats` - Catalog statistics";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists ECU files, newest first unless another sort is given.
    #[poise::command(slash_command, rename = "list")]
    #[allow(clippy::too_many_arguments)]
    pub async fn files_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search title, description, model or system"] search: Option<String>,
        #[description = "pending, active, rejected or archived"]
        #[autocomplete = "autocomplete::autocomplete_file_status"]
        status: Option<String>,
        #[description = "File category"]
        #[autocomplete = "autocomplete::autocomplete_file_category"]
        category: Option<String>,
        #[description = "Brand id (e.g., bmw)"] brand: Option<String>,
        #[description = "date, title, price, downloads or popularity"] sort: Option<String>,
        #[description = "Sort descending (default for date)"] descending: Option<bool>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();

        let status = status
            .as_deref()
            .map(|raw| {
                FileStatus::parse(raw).ok_or_else(|| {
                    Error::invalid("status", "Status is pending, active, rejected or archived")
                })
            })
            .transpose()?;
        let category = category
            .as_deref()
            .map(|raw| {
                FileCategory::parse(raw)
                    .ok_or_else(|| Error::invalid("category", format!("Unknown category '{raw}'")))
            })
            .transpose()?;
        let sort = sort
            .as_deref()
            .map(|raw| {
                FileField::parse(raw).ok_or_else(|| {
                    Error::invalid("sort", "Sort by date, title, price, downloads or popularity")
                })
            })
            .transpose()?
            .map(|field| SortSpec {
                field,
                direction: match descending {
                    Some(true) => SortDirection::Descending,
                    Some(false) => SortDirection::Ascending,
                    None if field == FileField::Date => SortDirection::Descending,
                    None => SortDirection::Ascending,
                },
            });

        let query = FileQuery {
            search: search.unwrap_or_default(),
            brand_id: brand.map(|b| b.trim().to_lowercase()),
            category,
            status,
            sort,
            pagination: Some(data.pagination(page)),
            ..FileQuery::default()
        };
        let result = ecu_file::list_files(&data.database, &query).await?;
        let currency = data.currency().await;

        let message = render::page_message(
            "ECU files",
            &result,
            "No ECU files match your filters.",
            |file| render::file_line(file, &currency),
        );
        ctx.say(message).await?;
        Ok(())
    }

    async fn review(
        ctx: poise::Context<'_, BotData, Error>,
        file_id: i64,
        action: FileAction,
    ) -> Result<()> {
        let admin = ctx.author().name.clone();
        let file = ecu_file::change_status(&ctx.data().database, file_id, action, &admin).await?;

        ctx.say(format!(
            "✅ **{}** {}. Status is now `{}`.",
            file.title,
            action.verb(),
            file.status
        ))
        .await?;
        Ok(())
    }

    /// Publishes a pending file.
    #[poise::command(slash_command, rename = "approve")]
    pub async fn files_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "File id"] file_id: i64,
    ) -> Result<()> {
        review(ctx, file_id, FileAction::Approve).await
    }

    /// Rejects a pending file.
    #[poise::command(slash_command, rename = "reject")]
    pub async fn files_reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "File id"] file_id: i64,
    ) -> Result<()> {
        review(ctx, file_id, FileAction::Reject).await
    }

    /// Archives a file. Archived files cannot change status again.
    #[poise::command(slash_command, rename = "archive")]
    pub async fn files_archive(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "File id"] file_id: i64,
    ) -> Result<()> {
        review(ctx, file_id, FileAction::Archive).await
    }

    /// Deletes a file from the catalog.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn files_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "File id"] file_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let file = ecu_file::require_file(db, file_id).await?;
        ecu_file::delete_file(db, file_id).await?;

        warn!(file_id, admin = %ctx.author().name, "File deleted from Discord");
        ctx.say(format!("🗑️ **{}** has been deleted.", file.title))
            .await?;
        Ok(())
    }

    /// Shows catalog statistics.
    #[poise::command(slash_command, rename = "stats")]
    pub async fn files_stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let stats = report::file_stats(&ctx.data().database).await?;

        let active_share = report::percentage(stats.active, stats.total);
        let most_downloaded = stats
            .most_downloaded
            .as_ref()
            .map_or_else(|| "-".to_string(), |(id, title)| format!("`#{id}` {title}"));

        let embed = serenity::CreateEmbed::default()
            .title("ECU file statistics")
            .color(0x0058_65F2)
            .field("Total", stats.total.to_string(), true)
            .field("Active", stats.active.to_string(), true)
            .field("Pending review", stats.pending.to_string(), true)
            .field("Rejected", stats.rejected.to_string(), true)
            .field("Archived", stats.archived.to_string(), true)
            .field("Downloads", stats.downloads.to_string(), true)
            .field("Published", report::format_progress_bar(active_share, None), false)
            .field("Most downloaded", most_downloaded, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
