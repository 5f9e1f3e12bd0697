//! json-server compatible REST surface over a [`ResourceStore`].
//!
//! `GET /{collection}?field=value&_sort=field&_order=asc|desc` lists,
//! `GET|PATCH|DELETE /{collection}/{id}` address one record and
//! `POST /{collection}` creates one.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use educollab_shared::{Collection, EntityId};
use educollab_store::{Filter, FilterValue, ResourceStore, SortOrder};

use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/:collection", get(list_records).post(create_record))
        .route(
            "/:collection/:id",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn collection(name: &str) -> Result<Collection, ServerError> {
    name.parse()
        .map_err(|_| ServerError::NotFound(format!("unknown collection '{name}'")))
}

/// Translate json-server query parameters into a [`Filter`].
///
/// `true`/`false` match booleans; every other value matches text.
pub fn parse_filter(params: &[(String, String)]) -> Result<Filter, ServerError> {
    let mut filter = Filter::all();
    let mut sort_field = None;
    let mut order = SortOrder::Asc;

    for (key, value) in params {
        match key.as_str() {
            "_sort" => sort_field = Some(value.clone()),
            "_order" => {
                order = match value.to_ascii_lowercase().as_str() {
                    "asc" => SortOrder::Asc,
                    "desc" => SortOrder::Desc,
                    other => {
                        return Err(ServerError::BadRequest(format!("invalid _order '{other}'")))
                    }
                }
            }
            _ => {
                let value = match value.as_str() {
                    "true" => FilterValue::Bool(true),
                    "false" => FilterValue::Bool(false),
                    text => FilterValue::Text(text.to_string()),
                };
                filter = filter.eq(key, value);
            }
        }
    }

    if let Some(field) = sort_field {
        filter = filter.sort_by(&field, order);
    }
    filter.validate()?;
    Ok(filter)
}

async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Value>>, ServerError> {
    let collection = collection(&name)?;
    let filter = parse_filter(&params)?;
    Ok(Json(state.store.list(collection, &filter).await?))
}

async fn get_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, ServerError> {
    let collection = collection(&name)?;
    Ok(Json(state.store.get(collection, &EntityId::from(id)).await?))
}

async fn create_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ServerError> {
    let collection = collection(&name)?;
    let created = state.store.create(collection, record).await?;
    info!(collection = %collection, id = ?created.get("id"), "record created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, ServerError> {
    let collection = collection(&name)?;
    Ok(Json(
        state
            .store
            .update(collection, &EntityId::from(id), patch)
            .await?,
    ))
}

async fn delete_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, ServerError> {
    let collection = collection(&name)?;
    state.store.delete(collection, &EntityId::from(id.clone())).await?;
    info!(collection = %collection, id = %id, "record deleted");
    Ok(Json(json!({})))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
