//! Customer Discord commands - `/customers list|add|grant|status|delete`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, render},
        core::{
            collection::{SortDirection, SortSpec},
            customer::{self, CustomerField, CustomerQuery, NewCustomer},
            report::format_token_amount,
        },
        entities::customer::CustomerStatus,
        errors::{Error, Result},
    };
    use tracing::info;

    fn parse_status(raw: &str) -> Result<CustomerStatus> {
        CustomerStatus::parse(raw)
            .ok_or_else(|| Error::invalid("status", "Status is active or inactive"))
    }

    /// Parent command for the customers screen.
    #[poise::command(
        slash_command,
        subcommands(
            "customers_list",
            "customers_add",
            "customers_grant",
            "customers_status",
            "customers_delete"
        )
    )]
    pub async fn customers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Customer management command. Available subcommands:\n\
            `/customers list` - Browse and search customers\n\
            `/customers add` - Create a customer\n\
            `/customers grant` - Add tokens to a customer\n\
            `/customers status` - Activate or deactivate a customer\n\
            `/customers delete` - Delete a customer";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists customers with their token balances.
    #[poise::command(slash_command, rename = "list")]
    pub async fn customers_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Search name or email"] search: Option<String>,
        #[description = "active or inactive"] status: Option<String>,
        #[description = "name, email, tokens, status, dateCreated, lastActive or totalSpent"]
        sort: Option<String>,
        #[description = "Sort descending"] descending: Option<bool>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();

        let status = status.as_deref().map(parse_status).transpose()?;
        let sort = sort
            .as_deref()
            .map(|raw| {
                CustomerField::parse(raw).ok_or_else(|| {
                    Error::invalid(
                        "sort",
                        "Sort by name, email, tokens, status, dateCreated, lastActive or totalSpent",
                    )
                })
            })
            .transpose()?
            .map(|field| SortSpec {
                field,
                direction: if descending.unwrap_or(false) {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            });

        let query = CustomerQuery {
            search: search.unwrap_or_default(),
            status,
            sort,
            pagination: Some(data.pagination(page)),
        };
        let result = customer::list_customers(&data.database, &query).await?;
        let currency = data.currency().await;

        let message = render::page_message(
            "Customers",
            &result,
            "No customers match your search.",
            |summary| render::customer_line(summary, &currency),
        );
        ctx.say(message).await?;
        Ok(())
    }

    /// Creates a customer account.
    #[poise::command(slash_command, rename = "add")]
    pub async fn customers_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Full name"] name: String,
        #[description = "E-mail address (must be unique)"] email: String,
        #[description = "active (default) or inactive"] status: Option<String>,
    ) -> Result<()> {
        let status = status.as_deref().map(parse_status).transpose()?;
        let created = customer::create_customer(
            &ctx.data().database,
            NewCustomer {
                name,
                email,
                status,
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Customer **{}** ({}) created with id `#{}`.",
            created.name, created.email, created.id
        ))
        .await?;
        Ok(())
    }

    /// Adds tokens to a customer. A negative amount removes tokens.
    #[poise::command(slash_command, rename = "grant")]
    pub async fn customers_grant(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer id"] customer_id: i64,
        #[description = "Tokens to add (negative to remove)"] amount: i64,
        #[description = "Reason, shown in the ledger"] note: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let target = customer::require_customer(db, customer_id).await?;
        let note = note.or_else(|| Some(format!("Granted by {}", ctx.author().name)));
        let balance = customer::grant_tokens(db, customer_id, amount, note).await?;

        info!(customer_id, amount, admin = %ctx.author().name, "Tokens granted from Discord");
        ctx.say(format!(
            "✅ {} for **{}**. New balance: **{} tokens**.",
            format_token_amount(amount),
            target.name,
            balance
        ))
        .await?;
        Ok(())
    }

    /// Activates or deactivates a customer.
    #[poise::command(slash_command, rename = "status")]
    pub async fn customers_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer id"] customer_id: i64,
        #[description = "active or inactive"] status: String,
    ) -> Result<()> {
        let status = parse_status(&status)?;
        let updated =
            customer::update_customer_status(&ctx.data().database, customer_id, status).await?;

        ctx.say(format!(
            "✅ **{}** is now {}.",
            updated.name,
            updated.status.label().to_lowercase()
        ))
        .await?;
        Ok(())
    }

    /// Deletes a customer together with their token history.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn customers_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer id"] customer_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let target = customer::require_customer(db, customer_id).await?;
        customer::delete_customer(db, customer_id).await?;

        ctx.say(format!("🗑️ Customer **{}** has been deleted.", target.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
