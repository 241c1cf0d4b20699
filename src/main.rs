use autotechno::{
    api::{self, AppState},
    bot::{self, BotData},
    config::{self, AdminConfig},
    core::{auth, seed, settings},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the real environment
    dotenv().ok();

    // `autotechno hash-password <password>` prints a value for ADMIN_PASSWORD_HASH
    let args: Vec<String> = env::args().skip(1).collect();
    if let [command, password] = args.as_slice() {
        if command == "hash-password" {
            println!("{}", auth::hash_password(password)?);
            return Ok(());
        }
    }

    // 3. Load configuration
    let app_config = config::app::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let admin = AdminConfig::from_env();
    if !admin.login_enabled() {
        warn!("ADMIN_EMAIL or ADMIN_PASSWORD_HASH not set, admin login is disabled");
    }

    // 4. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed demo data and settings defaults
    if app_config.store.seed_demo_data {
        if let Some(summary) = seed::seed_store(&db).await? {
            info!(?summary, "Seeded demo store");
        }
    }
    let written = settings::seed_settings(&db, &app_config.storefront).await?;
    if written > 0 {
        info!(written, "Stored default settings");
    }

    // 6. Run the HTTP server, and the bot when a token is configured
    let bind_address = app_config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Storefront API listening on {}", bind_address);

    let router = api::create_router(AppState::new(db.clone(), app_config.clone(), admin.clone()));
    let server = async {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(Error::from)
    };

    match env::var("DISCORD_BOT_TOKEN") {
        Ok(token) if !token.trim().is_empty() => {
            let data = BotData::new(db, app_config, admin);
            tokio::select! {
                result = server => result?,
                result = bot::run_bot(token, data) => {
                    result.inspect_err(|e| error!("Discord bot stopped: {}", e))?;
                }
            }
        }
        _ => {
            info!("DISCORD_BOT_TOKEN not set, running without the Discord back office");
            server.await?;
        }
    }

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
