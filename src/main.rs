use callbridge::bolna::BolnaClient;
use callbridge::config::Config;
use callbridge::consts::{INTER_RECORD_DELAY_MILLIS, INTER_SEND_DELAY_MILLIS};
use callbridge::dispatch::{run_notification_dispatch, DispatchSummary};
use callbridge::extract::GroqExtractor;
use callbridge::handlers;
use callbridge::msg91::Msg91Client;
use callbridge::pg_store::PgStore;
use callbridge::pipeline::{run_ingestion, IngestionSummary};
use callbridge::types::AppState;

use axum::routing::{get, post};
use axum::Router;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "callbridge")]
#[command(about = "Fetch voice-AI calls, extract contact details, and send WhatsApp follow-ups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (and the periodic sync when configured)
    Serve,
    /// Fetch new calls from the voice-AI provider and store them
    Sync,
    /// Send WhatsApp follow-ups for stored calls still awaiting one
    Notify,
    /// Sync, then notify
    RunAll,
    /// Delete every stored call record
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("callbridge", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error=%e, "missing required configuration");
            std::process::exit(1);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let http_client = reqwest::Client::new();
    let app_state = Arc::new(AppState {
        store: Arc::new(PgStore::new(pool)),
        source: Arc::new(BolnaClient::new(
            http_client.clone(),
            config.bolna_base_url.clone(),
            config.bolna_agent_id.clone(),
            config.bolna_api_key.clone(),
        )),
        extractor: Arc::new(GroqExtractor::new(
            http_client.clone(),
            config.groq_api_key.clone(),
            config.groq_model.clone(),
        )),
        messenger: Arc::new(Msg91Client::new(
            http_client,
            config.msg91_api_key.clone(),
            config.msg91_number.clone(),
            config.msg91_template_name.clone(),
        )),
    });

    match cli.command {
        Commands::Serve => serve(app_state, &config).await,
        Commands::Sync => {
            let summary = sync(&app_state).await;
            print_summary(&summary);
        }
        Commands::Notify => {
            let summary = notify(&app_state).await;
            print_summary(&summary);
        }
        Commands::RunAll => {
            let ingested = sync(&app_state).await;
            print_summary(&ingested);
            let dispatched = notify(&app_state).await;
            print_summary(&dispatched);
        }
        Commands::Clear => {
            let removed = app_state
                .store
                .clear_all()
                .await
                .expect("failed to clear call records");
            info!(removed, "cleared call records");
        }
    }
}

async fn sync(app_state: &AppState) -> IngestionSummary {
    run_ingestion(
        app_state.source.as_ref(),
        app_state.extractor.as_ref(),
        app_state.store.as_ref(),
        Duration::from_millis(INTER_RECORD_DELAY_MILLIS),
    )
    .await
}

async fn notify(app_state: &AppState) -> DispatchSummary {
    run_notification_dispatch(
        app_state.store.as_ref(),
        app_state.messenger.as_ref(),
        Duration::from_millis(INTER_SEND_DELAY_MILLIS),
    )
    .await
}

fn print_summary<T: serde::Serialize>(summary: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(summary).expect("summary serializes")
    );
}

async fn serve(app_state: Arc<AppState>, config: &Config) {
    if let Some(minutes) = config.sync_interval_minutes {
        let state = app_state.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
            // the first tick fires immediately; wait a full interval instead
            ticker.tick().await;
            loop {
                ticker.tick().await;
                info!("scheduled sync starting");
                sync(&state).await;
            }
        });
    }

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/calls", get(handlers::list_calls))
        .route("/api/sync", post(handlers::sync))
        .route("/api/notify", post(handlers::notify))
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
