//! Token Discord commands - packages, service costs, the ledger and sales totals.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, render},
        core::{
            catalog::{self, PackageDraft},
            ledger::{self, TransactionQuery},
            report,
        },
        entities::{TokenPackageModel, token_transaction::TransactionKind},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use sea_orm::DatabaseConnection;

    fn price_cents(price: f64) -> Result<i64> {
        render::price_to_cents(price)
            .ok_or_else(|| Error::invalid("price", "Price must be a positive amount"))
    }

    async fn package_named(db: &DatabaseConnection, name: &str) -> Result<TokenPackageModel> {
        catalog::get_package_by_name(db, name)
            .await?
            .ok_or_else(|| Error::invalid("name", format!("No package named '{name}'")))
    }

    /// Parent command for the tokens tab.
    #[poise::command(
        slash_command,
        subcommands(
            "tokens_packages",
            "tokens_package_add",
            "tokens_package_update",
            "tokens_services",
            "tokens_service_update",
            "tokens_transactions",
            "tokens_stats"
        )
    )]
    pub async fn tokens(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Token management command. Available subcommands:\n\
            `/tokens packages` - List token packages\n\
            `/tokens package_add` - Add a token package\n\
            `/tokens package_update` - Change a token package\n\
            `/tokens services` - List service costs\n\
            `/tokens service_update` - Change a service cost\n\
            `/tokens transactions` - Browse the token ledger\n\
            `/tokens stats` - Sales and usage totals";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists token packages.
    #[poise::command(slash_command, rename = "packages")]
    pub async fn tokens_packages(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let packages = catalog::list_packages(&data.database).await?;

        if packages.is_empty() {
            ctx.say("No token packages yet. Use `/tokens package_add` to create one.")
                .await?;
            return Ok(());
        }

        let currency = data.currency().await;
        let lines: Vec<String> = packages
            .iter()
            .map(|p| render::package_line(p, &currency))
            .collect();
        ctx.say(format!("**Token packages**\n{}", lines.join("\n")))
            .await?;
        Ok(())
    }

    /// Adds a token package.
    #[poise::command(slash_command, rename = "package_add")]
    pub async fn tokens_package_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Package name (must be unique)"] name: String,
        #[description = "Tokens credited"] tokens: i64,
        #[description = "Price (e.g., 39.99)"] price: f64,
        #[description = "Discount shown in the shop, 0-100"] discount: Option<i32>,
        #[description = "Highlight as popular"] popular: Option<bool>,
    ) -> Result<()> {
        let draft = PackageDraft {
            name,
            tokens,
            price_cents: price_cents(price)?,
            discount_percentage: discount.unwrap_or(0),
            popular: popular.unwrap_or(false),
        };
        let package = catalog::create_package(&ctx.data().database, draft).await?;
        let currency = ctx.data().currency().await;

        ctx.say(format!(
            "✅ Package added: {}",
            render::package_line(&package, &currency)
        ))
        .await?;
        Ok(())
    }

    /// Changes a token package. Omitted fields keep their value.
    #[poise::command(slash_command, rename = "package_update")]
    pub async fn tokens_package_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Package to change"]
        #[autocomplete = "autocomplete::autocomplete_package_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "Tokens credited"] tokens: Option<i64>,
        #[description = "Price (e.g., 39.99)"] price: Option<f64>,
        #[description = "Discount shown in the shop, 0-100"] discount: Option<i32>,
        #[description = "Highlight as popular"] popular: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let existing = package_named(db, &name).await?;

        let draft = PackageDraft {
            name: new_name.unwrap_or_else(|| existing.name.clone()),
            tokens: tokens.unwrap_or(existing.tokens),
            price_cents: price.map(price_cents).transpose()?.unwrap_or(existing.price_cents),
            discount_percentage: discount.unwrap_or(existing.discount_percentage),
            popular: popular.unwrap_or(existing.popular),
        };
        let package = catalog::update_package(db, existing.id, draft).await?;
        let currency = ctx.data().currency().await;

        ctx.say(format!(
            "✅ Package updated: {}",
            render::package_line(&package, &currency)
        ))
        .await?;
        Ok(())
    }

    /// Lists service costs.
    #[poise::command(slash_command, rename = "services")]
    pub async fn tokens_services(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let services = catalog::list_services(&ctx.data().database).await?;

        if services.is_empty() {
            ctx.say("No services are priced yet.").await?;
            return Ok(());
        }

        let lines: Vec<String> = services.iter().map(render::service_line).collect();
        ctx.say(format!("**Service costs**\n{}", lines.join("\n")))
            .await?;
        Ok(())
    }

    /// Changes the token cost of a service.
    #[poise::command(slash_command, rename = "service_update")]
    pub async fn tokens_service_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Service key"]
        #[autocomplete = "autocomplete::autocomplete_service_key"]
        key: String,
        #[description = "New cost in tokens"] cost: i64,
    ) -> Result<()> {
        let service = catalog::update_service_cost(&ctx.data().database, &key, cost).await?;

        ctx.say(format!("✅ {}", render::service_line(&service)))
            .await?;
        Ok(())
    }

    /// Browses the token ledger, newest first.
    #[poise::command(slash_command, rename = "transactions")]
    pub async fn tokens_transactions(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this customer id"] customer_id: Option<i64>,
        #[description = "purchase, usage or adjustment"] kind: Option<String>,
        #[description = "Search customer, method or service"] search: Option<String>,
        #[description = "Page number (starts at 1)"] page: Option<u64>,
    ) -> Result<()> {
        let data = ctx.data();

        let kind = kind
            .as_deref()
            .map(|raw| {
                TransactionKind::parse(raw).ok_or_else(|| {
                    Error::invalid("kind", "Kind is purchase, usage or adjustment")
                })
            })
            .transpose()?;

        let query = TransactionQuery {
            customer_id,
            kind,
            search: search.unwrap_or_default(),
            sort: None,
            pagination: Some(data.pagination(page)),
        };
        let result = ledger::list_transactions(&data.database, &query).await?;

        let message = render::page_message(
            "Token transactions",
            &result,
            "No transactions match your filters.",
            render::transaction_line,
        );
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows token sales and usage totals.
    #[poise::command(slash_command, rename = "stats")]
    pub async fn tokens_stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let stats = report::token_stats(&data.database).await?;
        let currency = data.currency().await;

        let embed = serenity::CreateEmbed::default()
            .title("Token statistics")
            .color(0x0058_65F2)
            .field("Tokens sold", stats.tokens_sold.to_string(), true)
            .field("Tokens used", stats.tokens_used.to_string(), true)
            .field(
                "Revenue",
                report::format_price(stats.revenue_cents, &currency),
                true,
            )
            .field("Purchases", stats.purchases.to_string(), true)
            .field("Service uses", stats.usages.to_string(), true);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
