//! Bot layer - Discord back office for store admins
//!
//! Slash commands for customers, ECU files, tokens and settings. Every command goes
//! through [`checks::is_admin`], so only user ids from `ADMIN_DISCORD_IDS` get answers.

/// Allowlist check run before every command
pub mod checks;
/// Discord command implementations (customers, files, tokens, settings, general)
pub mod commands;
/// Discord interaction handlers (autocomplete)
pub mod handlers;
/// Text rendering shared by the commands
pub mod render;

use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

use crate::{
    config::{AdminConfig, AppConfig},
    core::{
        collection::Pagination,
        settings::{self, SettingKey},
    },
    errors::{Error, Result},
};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application config, used for paging and currency display
    pub config: AppConfig,
    /// Admin identity and Discord allowlist
    pub admin: AdminConfig,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, config: AppConfig, admin: AdminConfig) -> Self {
        Self {
            database,
            config,
            admin,
        }
    }

    /// Page request for list commands, sized by the store config.
    #[must_use]
    pub fn pagination(&self, page: Option<u64>) -> Pagination {
        Pagination::from_request(
            page,
            None,
            self.config.store.default_page_size,
            self.config.store.max_page_size,
        )
    }

    /// Currency code for prices: the stored setting, else the config default.
    pub async fn currency(&self) -> String {
        match settings::get_setting(&self.database, SettingKey::Currency).await {
            Ok(Some(currency)) => currency,
            Ok(None) => self.config.storefront.currency.clone(),
            Err(e) => {
                warn!("Falling back to configured currency: {}", e);
                self.config.storefront.currency.clone()
            }
        }
    }
}

/// Every registered command.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::customers(),
        commands::files(),
        commands::features(),
        commands::tokens(),
        commands::settings(),
    ]
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = match &error {
                Error::Database(_) | Error::Io(_) | Error::FrameworkError(_) => {
                    error!("Error in command `{}`: {:?}", ctx.command().name, error);
                    "❌ Something went wrong. Please try again later.".to_string()
                }
                other => format!("❌ {other}"),
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed { ctx, .. } => {
            warn!(user = %ctx.author().id, command = %ctx.command().name, "Rejected non-admin");
            if let Err(e) = ctx.say("⛔ This command is restricted to store admins.").await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            command_check: Some(|ctx| Box::pin(checks::is_admin(ctx))),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered commands globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
