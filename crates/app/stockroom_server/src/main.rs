//! Stockroom HTTP server binary.
//!
//! Loads `.env`, connects to PostgreSQL, applies migrations and serves the
//! router until interrupted.

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "stockroom_server", about = "Stockroom inventory and renewal server")]
struct Args {
    /// Port to listen on. Overrides the port in `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/stockroom"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a bcrypt hash suitable for `ACCOUNT_PASSWORD` and exit.
    HashPassword {
        /// Plain-text password to hash.
        password: String,
    },
}

/// Replace the port of a `host:port` address.
fn with_port(bind_addr: &str, port: u16) -> String {
    let host = bind_addr
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(bind_addr);
    format!("{host}:{port}")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,stockroom_api=debug,stockroom_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = &args.command {
        println!("{}", stockroom_core::auth::password::hash_password(password)?);
        return Ok(());
    }

    let mut config = stockroom_api::config::ApiConfig::from_env()?;
    config.database_url = args.database_url.clone();
    if let Some(port) = args.port {
        config.bind_addr = with_port(&config.bind_addr, port);
    }

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        secure_cookies = config.secure_cookies,
        "starting stockroom_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    stockroom_api::migrate(&pool).await?;

    let bind_addr = config.bind_addr.clone();
    let state = stockroom_api::AppState::new(pool, config)?;
    let app = stockroom_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override_keeps_host() {
        assert_eq!(with_port("127.0.0.1:3100", 8080), "127.0.0.1:8080");
        assert_eq!(with_port("0.0.0.0:80", 3000), "0.0.0.0:3000");
        assert_eq!(with_port("localhost", 3000), "localhost:3000");
    }

    #[test]
    fn parses_hash_password_subcommand() {
        let args = Args::try_parse_from(["stockroom_server", "hash-password", "s3cret"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::HashPassword { ref password }) if password == "s3cret"
        ));
    }
}
