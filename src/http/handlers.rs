use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State as AxumState,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::state::State;
use crate::core::export::{render_csv, render_pdf, render_xlsx, ExportFormat};
use crate::core::sheet::{parse_rows, SheetFormat};
use crate::domain::model::{
    AttendeeRecord, CountResponse, ItemsUpdate, MessageResponse, NewAttendee,
};
use crate::domain::ports::Storage;
use crate::utils::error::{CheckinError, Result};

pub const UPLOAD_FIELD: &str = "file";

pub async fn hello_handler() -> &'static str {
    "Hello, World!"
}

struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

fn multipart_error(e: MultipartError, limit: usize) -> CheckinError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CheckinError::PayloadTooLarge { limit }
    } else {
        tracing::debug!("Unreadable multipart body: {}", e.body_text());
        CheckinError::MissingFile
    }
}

async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.is_empty() {
            return Err(CheckinError::MissingFile);
        }

        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(CheckinError::MissingFile)
}

/// Runs CPU-bound parsing or rendering off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| CheckinError::Internal {
            message: format!("background task failed: {e}"),
        })?
}

pub async fn upload_handler(
    AxumState(state): AxumState<Arc<State>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<CountResponse>> {
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart, state.config.max_upload_bytes).await?;
    tracing::info!(
        "Received upload {:?} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let rows = run_blocking(move || {
        let format = SheetFormat::detect(upload.file_name.as_deref(), &upload.bytes)?;
        parse_rows(&upload.bytes, format)
    })
    .await?;

    let count = state.registry.lock().await.import(rows);

    Ok(Json(CountResponse {
        message: "Data uploaded".to_string(),
        count,
    }))
}

pub async fn list_handler(AxumState(state): AxumState<Arc<State>>) -> Json<Vec<AttendeeRecord>> {
    let registry = state.registry.lock().await;
    Json(registry.list().to_vec())
}

pub async fn update_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: std::result::Result<Json<ItemsUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(update) = payload?;
    let target = update.target()?;

    let mut registry = state.registry.lock().await;
    let record = registry.update(target, update.items_received)?;
    tracing::info!(
        "Attendee '{}' now has {} items",
        record.name,
        record.items_received.len()
    );

    Ok(Json(MessageResponse {
        message: "Attendee updated".to_string(),
    }))
}

pub async fn add_handler(
    AxumState(state): AxumState<Arc<State>>,
    payload: std::result::Result<Json<NewAttendee>, JsonRejection>,
) -> Result<Json<CountResponse>> {
    let Json(attendee) = payload?;
    let count = state.registry.lock().await.append(attendee)?;

    Ok(Json(CountResponse {
        message: "Attendee added".to_string(),
        count,
    }))
}

/// Keeps a copy of an export; a failed write only costs the copy.
pub async fn archive_export<S: Storage>(storage: &S, format: ExportFormat, bytes: &[u8]) {
    match storage.write_file(&format.file_name(), bytes).await {
        Ok(()) => tracing::debug!("Archived {}", format.file_name()),
        Err(e) => tracing::warn!("Failed to archive {} export: {}", format.label(), e),
    }
}

async fn attachment(state: &State, format: ExportFormat, bytes: Vec<u8>) -> Response {
    if let Some(storage) = &state.downloads {
        archive_export(storage, format, &bytes).await;
    }

    tracing::info!("Serving {} ({} bytes)", format.file_name(), bytes.len());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format.content_disposition()),
        ],
        bytes,
    )
        .into_response()
}

pub async fn download_xlsx_handler(AxumState(state): AxumState<Arc<State>>) -> Result<Response> {
    let rows = state.registry.lock().await.export_table();
    let bytes = run_blocking(move || render_xlsx(&rows)).await?;
    Ok(attachment(&state, ExportFormat::Xlsx, bytes).await)
}

pub async fn download_csv_handler(AxumState(state): AxumState<Arc<State>>) -> Result<Response> {
    let rows = state.registry.lock().await.export_table();
    let bytes = run_blocking(move || render_csv(&rows)).await?;
    Ok(attachment(&state, ExportFormat::Csv, bytes).await)
}

pub async fn download_pdf_handler(AxumState(state): AxumState<Arc<State>>) -> Result<Response> {
    let listing = state
        .registry
        .lock()
        .await
        .export_document(&state.config.document_title);
    let generated_at = Utc::now();
    let bytes = run_blocking(move || render_pdf(&listing, generated_at)).await?;
    Ok(attachment(&state, ExportFormat::Pdf, bytes).await)
}
