use clap::Parser;
use migration::{Migrator, MigratorTrait};
use secrecy::ExposeSecret;
use settings::Database;

mod settings;

/// Personal bookkeeping server.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Settings file; the extension may be omitted.
    #[arg(long, env = "MONEYBOOK_CONFIG", default_value = "settings")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "moneybook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database)
        .await
        .inspect_err(|err| tracing::error!("failed to initialize database: {err}"))?;

    let cipher = engine::ValueCipher::new(Some(settings.secret.encryption_key.expose_secret()));
    let engine = engine::Engine::builder()
        .database(db)
        .cipher(cipher)
        .build()
        .await
        .inspect_err(|err| tracing::error!("failed to build engine from database: {err}"))?;

    let signer = server::TokenSigner::new(
        settings.auth.token_key.expose_secret().as_bytes(),
        settings.auth.token_ttl_hours,
    )
    .inspect_err(|err| tracing::error!("invalid auth settings: {err}"))?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    server::run(engine, signer, &addr)
        .await
        .inspect_err(|err| tracing::error!("server failed: {err}"))?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
