use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the record server's HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be parsed as JSON.
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The body was a bare JSON scalar; only objects and arrays are accepted.
    #[error("request body must be a JSON object or array")]
    ScalarBody,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidBody(_) | ApiError::ScalarBody => StatusCode::BAD_REQUEST,
        };

        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Errors raised while talking to the record server or the dataset host.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS, ...).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body was not the JSON we expected.
    #[error("could not decode response payload: {0}")]
    Decode(#[from] serde_json::Error),
}
