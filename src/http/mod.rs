//! # HTTP surface
//!
//! | Method | Path | Body | Response |
//! |---|---|---|---|
//! | GET | `/` | | plaintext greeting |
//! | POST | `/upload` | multipart, part named `file` | `{message, count}` |
//! | GET | `/attendees` | | array of attendees |
//! | POST | `/attendees` | `{index, items_received}` or `{id, items_received}` | `{message}` |
//! | GET | `/download/xlsx` | | `attendees.xlsx` |
//! | GET | `/download/csv` | | `attendees.csv` |
//! | GET | `/download/pdf` | | `attendees.pdf` |
//! | POST | `/add` | attendee JSON | `{message, count}` |
//!
//! Failures come back as `{"error": "..."}` with a 4xx status for client
//! mistakes and 500 for export or IO failures.
use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

use crate::config::ServerConfig;
use crate::utils::error::Result;
use handlers::{
    add_handler, download_csv_handler, download_pdf_handler, download_xlsx_handler,
    hello_handler, list_handler, update_handler, upload_handler,
};
pub use state::State;

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(hello_handler))
        .route("/upload", post(upload_handler))
        .route("/attendees", get(list_handler).post(update_handler))
        .route("/download/xlsx", get(download_xlsx_handler))
        .route("/download/csv", get(download_csv_handler))
        .route("/download/pdf", get(download_pdf_handler))
        .route("/add", post(add_handler))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> Result<()> {
    info!("Initializing state...");
    if let Some(dir) = &config.downloads_dir {
        info!("Exports will also be written to {dir}");
    }
    let state = State::new(config);

    let address = state.config.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;

    let app = build_router(state);
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
