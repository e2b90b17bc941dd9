//! HTTP façade for dns-manager
//!
//! Exposes the reconciler as two resources:
//!
//! | Path      | Query                   | Methods          |
//! |-----------|-------------------------|------------------|
//! | `/zone`   | `name`                  | GET, PUT, DELETE |
//! | `/record` | `zone`, `domain`, `type`| GET, PUT, DELETE |
//!
//! `PUT /record` takes the answers as a JSON body, e.g. `[["1.2.3.4"]]`.
//! `GET /` returns a plain-text index. Any other method is answered 405.

pub mod errors;
pub mod reply;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use reply::{ApiReply, STORE_ERROR_HEADER};
pub use routes::create_routes;
pub use state::AppState;

/// Bind `listen` and serve the façade until `shutdown` resolves
pub async fn serve<F>(listen: &str, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_routes(state))
        .with_graceful_shutdown(shutdown)
        .await
}
