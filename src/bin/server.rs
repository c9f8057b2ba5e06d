use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use sheet_ledger::{
    AppState, build_router, count_users, graceful_shutdown,
    sheets::{GoogleSheet, InMemorySheet, Sheet},
};

/// The REST API server for sheet_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH", default_value = "sheet_ledger.db")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 5555)]
    port: u16,

    /// The ID of the Google spreadsheet that holds every user's sheet.
    #[arg(long, env = "SHEET_ID", required_unless_present = "offline")]
    spreadsheet_id: Option<String>,

    /// File path to the Google service account key.
    #[arg(
        long,
        env = "GOOGLE_SERVICE_ACCOUNT_KEY",
        default_value = "google-service-account.json"
    )]
    service_account_key: PathBuf,

    /// How long to wait for each request to the spreadsheet service.
    #[arg(long, env = "SHEETS_TIMEOUT_SECS", default_value_t = 10)]
    sheets_timeout_secs: u64,

    /// Keep sheets in memory instead of using Google Sheets. Data is lost on exit.
    #[arg(long)]
    offline: bool,

    /// File path for the debug log.
    #[arg(long, env = "LOG_FILE", default_value = "debug.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_file);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let sheet: Arc<dyn Sheet> = match (&args.spreadsheet_id, args.offline) {
        (_, true) => {
            tracing::warn!("Running offline: sheets are kept in memory and lost on exit");
            Arc::new(InMemorySheet::new())
        }
        (Some(spreadsheet_id), false) => Arc::new(
            GoogleSheet::new(
                spreadsheet_id,
                &args.service_account_key,
                Duration::from_secs(args.sheets_timeout_secs),
            )
            .await
            .expect("Could not create the Google Sheets client"),
        ),
        (None, false) => unreachable!("clap requires --spreadsheet-id unless --offline is set"),
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let state = AppState::new(conn, sheet).expect("Could not initialize the database");

    match count_users(
        &state
            .db_connection
            .lock()
            .expect("Could not acquire database lock"),
    ) {
        Ok(count) => tracing::info!("Loaded database {} with {count} users", args.db_path),
        Err(error) => tracing::warn!("Could not count users: {error}"),
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn setup_logging(log_file: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
