//! General Discord commands - ping and help.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} back office**\n\n\
        **Customers**\n\
        • `/customers list [search] [status] [sort] [descending] [page]` - Browse customers.\n\
        • `/customers add <name> <email> [status]` - Create a customer.\n\
        • `/customers grant <id> <amount> [note]` - Add (or remove) tokens.\n\
        • `/customers status <id> <status>` - Activate or deactivate.\n\
        • `/customers delete <id>` - Delete a customer and their ledger.\n\n\
        **ECU files**\n\
        • `/files list [search] [status] [category] [brand] [sort] [descending] [page]` - Browse files.\n\
        • `/files approve|reject|archive <id>` - Review a file.\n\
        • `/files delete <id>` - Remove a file.\n\
        • `/files stats` - Catalog statistics.\n\n\
        **Tokens**\n\
        • `/tokens packages` / `/tokens package_add` / `/tokens package_update` - Token packages.\n\
        • `/tokens services` / `/tokens service_update` - Service costs.\n\
        • `/tokens transactions [customer] [kind] [search] [page]` - Ledger.\n\
        • `/tokens stats` - Sales and usage totals.\n\n\
        **Settings**\n\
        • `/settings list|get|set` - Store settings.\n\n\
        **Features**\n\
        • `/features [search] [group] [status] [page]` - Back-office tools and their status.\n\n\
        • `/ping` - Checks if the bot is responsive.",
            ctx.data().config.storefront.site_name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
