use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dnsm_core::Error;

/// Request failures raised by the façade itself, before the reconciler runs
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(Error::invalid_input(msg))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            err @ (Error::Store(_) | Error::Transport(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            err => {
                tracing::error!("Unexpected error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
