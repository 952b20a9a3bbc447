use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use teloxide::types::UserId;

mod broker;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spending_bot={level},telegram_bot={level},engine={level},storage={level},rates={level}",
            level = settings.app.level
        ))
        .init();

    let timezone: chrono_tz::Tz = settings
        .app
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {}: {err}", settings.app.timezone))?;

    let db = parse_database(&settings.database).await?;
    let storage = storage::Storage::new(db);

    let rates_url = settings
        .rates
        .as_ref()
        .and_then(|rates| rates.base_url.clone())
        .unwrap_or_else(|| rates::CBR_BASE_URL.to_string());
    let rates_client = rates::CbrClient::connect(&rates_url).await?;

    let (broker, mut series) = broker::ChannelBroker::channel(64);
    let engine = engine::Engine::new(storage, rates_client.clone(), broker, timezone);

    let mut tasks = tokio::task::JoinSet::new();

    tasks.spawn(async move {
        while let Some(msg) = series.recv().await {
            tracing::info!("report series for {}: {}", msg.key, msg.payload);
        }
    });

    let refresh_minutes = settings
        .rates
        .as_ref()
        .and_then(|rates| rates.refresh_minutes)
        .unwrap_or(60);
    tasks.spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(refresh_minutes * 60));
        // connect() already fetched once; skip the immediate first tick.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = rates_client.refresh().await {
                tracing::warn!("rates refresh failed: {err}");
            }
        }
    });

    let allowed_users: Vec<UserId> = settings
        .telegram
        .allowed_users
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(UserId)
        .collect();

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .allowed_users(allowed_users)
        .engine(engine)
        .statuses(storage::MemoryStatusStore::new())
        .build()?;
    tasks.spawn(async move {
        bot.run().await;
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
