use axum::{
    Json,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use dnsm_core::{Outcome, OutcomeBody};
use serde::Serialize;

/// Header carrying store failures that happened after the provider accepted
/// a change
pub const STORE_ERROR_HEADER: &str = "x-dnsm-store-error";

/// A reconciler outcome rendered as an HTTP response
///
/// Entities are sent as JSON, text as `text/plain`, empty bodies as nothing.
pub struct ApiReply<T>(pub Outcome<T>);

impl<T> From<Outcome<T>> for ApiReply<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self(outcome)
    }
}

impl<T: Serialize> IntoResponse for ApiReply<T> {
    fn into_response(self) -> Response {
        let Outcome {
            status,
            body,
            diagnostics,
        } = self.0;

        let mut response = match body {
            OutcomeBody::Entity(entity) => (status, Json(entity)).into_response(),
            OutcomeBody::Text(text) => (status, text).into_response(),
            OutcomeBody::Empty => status.into_response(),
        };

        if !diagnostics.is_empty() {
            match HeaderValue::from_str(&header_safe(&diagnostics.join("; "))) {
                Ok(value) => {
                    response.headers_mut().insert(STORE_ERROR_HEADER, value);
                }
                Err(e) => tracing::warn!("Dropping unencodable diagnostic header: {}", e),
            }
        }

        response
    }
}

/// Replace characters a header value cannot carry
fn header_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\t' || (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}
