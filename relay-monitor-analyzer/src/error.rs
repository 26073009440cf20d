use axum::{http::StatusCode, response::IntoResponse, Json};
use relay_monitor_types::Error as TypesError;

/// Errors surfaced by the query API; everything else (validation outcomes)
/// is data, not an error, and flows through `FaultRecord` instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown relay {0}")]
    UnknownRelay(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Types(#[from] TypesError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Self::UnknownRelay(..) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(..) => StatusCode::BAD_REQUEST,
            Self::Types(..) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
