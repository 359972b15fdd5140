mod api;
mod query;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use sea_orm_migration::MigratorTrait;
use std::path::PathBuf;
use std::{net::SocketAddr, time::Duration};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

use base::setting::{generate_default, get_settings, load, Settings, SETTINGS};
use base::{database::open_database, CLI_NAME};

#[derive(Parser)]
#[command(name = CLI_NAME, author, version, about, long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, name = "ADDRESS", default_value_t = String::from("127.0.0.1:5000"))]
    listen_address: String,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the default configuration
    DefaultConfig,
    /// Runs the HTTP server (default)
    Serve,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error! {error = %e, "Could not listen for the shutdown signal"};
        return;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    color_eyre::install()?;
    let tracing_builder = tracing_subscriber::registry().with(fmt::layer());
    if std::env::var(base::FYYUR_LOGLEVEL).is_ok() {
        tracing_builder.with(EnvFilter::from_env(base::FYYUR_LOGLEVEL))
    } else {
        tracing_builder.with(EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
    .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::DefaultConfig => {
            let default = generate_default(Settings::default())?;
            let str = toml::to_string(&default)?;
            println!("{}", str);
            Ok(())
        }
        Command::Serve => {
            // settings
            SETTINGS.get_or_try_init(async { load(cli.config) }).await?;
            let settings = get_settings()?;

            // database
            let db = open_database(settings).await?;
            migration::Migrator::up(&db, None).await?;

            let addr: SocketAddr = cli
                .listen_address
                .parse()
                .wrap_err(eyre!("Invalid listen address"))?;
            let state = api::AppState {
                db,
                recent_limit: settings.recent_limit,
            };
            let router = api::router(state, Duration::from_secs(settings.request_timeout));
            tracing::info! {%addr, "Listening"};
            axum::Server::bind(&addr)
                .serve(router.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
    }
}
