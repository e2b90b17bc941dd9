use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    routing::get,
};
use dnsm_core::{Record, RecordKey, Zone};
use serde::Deserialize;
use tracing::debug;

use crate::{errors::ApiError, reply::ApiReply, state::AppState};

const INDEX: &str = "/zone{?name} Zone manipulation\n\
                     /record{?zone,domain,type} Record manipulation\n";

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/zone", get(get_zone).put(put_zone).delete(delete_zone))
        .route(
            "/record",
            get(get_record).put(put_record).delete(delete_record),
        )
        .with_state(state)
}

async fn index() -> &'static str {
    INDEX
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ZoneQuery {
    name: Option<String>,
}

impl ZoneQuery {
    fn name(self) -> Result<String, ApiError> {
        self.name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::bad_request("name parameter is required"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordQuery {
    zone: Option<String>,
    domain: Option<String>,
    #[serde(rename = "type")]
    record_type: Option<String>,
}

impl RecordQuery {
    fn key(self) -> Result<RecordKey, ApiError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        match (
            present(self.zone),
            present(self.domain),
            present(self.record_type),
        ) {
            (Some(zone), Some(domain), Some(record_type)) => {
                Ok(RecordKey::new(zone, domain, record_type))
            }
            _ => Err(ApiError::bad_request(
                "parameters for zone, domain and type are all required",
            )),
        }
    }
}

async fn get_zone(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Result<ApiReply<Zone>, ApiError> {
    let name = query.name()?;
    Ok(state.reconciler.get_zone(&name).await.into())
}

async fn put_zone(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Result<ApiReply<Zone>, ApiError> {
    let name = query.name()?;
    Ok(state.reconciler.put_zone(Zone::new(name)).await.into())
}

async fn delete_zone(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> Result<ApiReply<Zone>, ApiError> {
    let name = query.name()?;
    Ok(state.reconciler.delete_zone(&name).await.into())
}

async fn get_record(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> Result<ApiReply<Record>, ApiError> {
    let key = query.key()?;
    Ok(state.reconciler.get_record(&key).await.into())
}

async fn put_record(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
    body: Bytes,
) -> Result<ApiReply<Record>, ApiError> {
    let key = query.key()?;

    let answers: Vec<Vec<String>> = serde_json::from_slice(&body).map_err(|e| {
        debug!(record = %key, "Rejecting answers body: {}", e);
        ApiError::bad_request(format!("could not parse answers: {}", e))
    })?;

    let record = Record::with_answers(key, answers);
    Ok(state.reconciler.put_record(record).await.into())
}

async fn delete_record(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> Result<ApiReply<Record>, ApiError> {
    let key = query.key()?;
    Ok(state.reconciler.delete_record(&key).await.into())
}
