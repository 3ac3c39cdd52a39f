use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::error::{CheckinError, ErrorCategory};

impl CheckinError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckinError::MissingFile
            | CheckinError::MalformedJson { .. }
            | CheckinError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            CheckinError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CheckinError::MalformedSpreadsheet { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CheckinError::IndexOutOfRange { .. } | CheckinError::UnknownAttendee { .. } => {
                StatusCode::NOT_FOUND
            }
            CheckinError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CheckinError::ConfigError { .. }
            | CheckinError::InvalidConfigValueError { .. }
            | CheckinError::ExportError { .. }
            | CheckinError::IoError(_)
            | CheckinError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CheckinError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.category() != ErrorCategory::Client {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for CheckinError {
    fn from(rejection: JsonRejection) -> Self {
        CheckinError::malformed_json(rejection.body_text())
    }
}

impl From<MultipartRejection> for CheckinError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!("Upload is not multipart: {}", rejection.body_text());
        CheckinError::MissingFile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let cases = [
            (CheckinError::MissingFile, StatusCode::BAD_REQUEST),
            (
                CheckinError::UnsupportedFormat {
                    file_name: "a.txt".to_string(),
                },
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                CheckinError::malformed_spreadsheet("missing Name"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CheckinError::IndexOutOfRange { index: 5, len: 1 },
                StatusCode::NOT_FOUND,
            ),
            (
                CheckinError::malformed_json("expected object"),
                StatusCode::BAD_REQUEST,
            ),
            (
                CheckinError::PayloadTooLarge { limit: 1024 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
        ];

        for (err, expected) in cases {
            assert!(err.is_client_error());
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[test]
    fn test_export_failure_is_server_error() {
        let err = CheckinError::ExportError {
            format: "pdf",
            message: "boom".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
