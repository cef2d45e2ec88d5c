//! HTTP adapter: translates verbs and paths into store calls.
//!
//! Every resource is mounted at `/{collection}` with the same route table;
//! see [`resource_router`].

use crate::config::{PutMode, ResourceConfig, ResourcesConfig};
use crate::error::StoreError;
use crate::models::{BlogPost, Fruit, Task};
use crate::record::{Record, Validate};
use crate::store::Store;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// Store error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(StoreError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        if status == StatusCode::BAD_REQUEST {
            warn!(error = %self.0, "Rejected request");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Query string accepted by list endpoints; a non-empty `search` wins over `title`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub title: Option<String>,
}

impl ListParams {
    pub fn filter_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|text| !text.is_empty())
            .or(self.title.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
}

/// Every store the server exposes, shared with the router by `Arc`
#[derive(Clone, Default)]
pub struct Stores {
    pub blogposts: Arc<Store<BlogPost>>,
    pub fruits: Arc<Store<Fruit>>,
    pub tasks: Arc<Store<Task>>,
}

impl Stores {
    /// Build empty stores with the configured identifier policies
    pub fn new(config: &ResourcesConfig) -> Self {
        Self {
            blogposts: Arc::new(Store::with_policy(config.blogposts.id_policy)),
            fruits: Arc::new(Store::with_policy(config.fruits.id_policy)),
            tasks: Arc::new(Store::with_policy(config.tasks.id_policy)),
        }
    }
}

struct ResourceState<T: Record> {
    store: Arc<Store<T>>,
    settings: ResourceConfig,
}

impl<T: Record> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings,
        }
    }
}

/// Decode a JSON body into a payload and run its validation
fn parse_payload<P: DeserializeOwned + Validate>(body: Value) -> Result<P, StoreError> {
    let payload: P = serde_json::from_value(body)?;
    payload.validate()?;
    Ok(payload)
}

async fn root() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

async fn list<T: Record>(State(state): State<ResourceState<T>>, Query(params): Query<ListParams>) -> Response {
    let records = state.store.list(params.filter_text());
    if state.settings.envelope {
        let body = HashMap::from([(T::collection_name(), records)]);
        return Json(body).into_response();
    }
    Json(records).into_response()
}

async fn create<T: Record>(
    State(state): State<ResourceState<T>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let Json(body) = body?;
    let draft: T::Draft = parse_payload(body)?;
    let record = state.store.create(draft);
    debug!(collection = T::collection_name(), id = %record.id(), "POST: created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_all<T: Record>(State(state): State<ResourceState<T>>) -> Json<DeleteAllResponse> {
    let deleted = state.store.delete_all();
    debug!(collection = T::collection_name(), deleted, "DELETE: cleared collection");
    Json(DeleteAllResponse { deleted })
}

async fn get_one<T: Record>(State(state): State<ResourceState<T>>, Path(id): Path<T::Id>) -> ApiResult<Json<T>> {
    Ok(Json(state.store.get(&id)?))
}

async fn put_one<T: Record>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<T::Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<T>> {
    let Json(body) = body?;
    let record = match state.settings.put {
        PutMode::Replace => state.store.replace(&id, parse_payload(body)?)?,
        PutMode::Merge => state.store.update(&id, parse_payload(body)?)?,
    };
    Ok(Json(record))
}

async fn patch_one<T: Record>(
    State(state): State<ResourceState<T>>,
    Path(id): Path<T::Id>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<T>> {
    let Json(body) = body?;
    Ok(Json(state.store.update(&id, parse_payload(body)?)?))
}

async fn delete_one<T: Record>(State(state): State<ResourceState<T>>, Path(id): Path<T::Id>) -> ApiResult<Json<T>> {
    Ok(Json(state.store.delete(&id)?))
}

/// Routes for one resource, relative to its mount point
pub fn resource_router<T: Record>(store: Arc<Store<T>>, settings: ResourceConfig) -> Router {
    Router::new()
        .route("/", get(list::<T>).post(create::<T>).delete(delete_all::<T>))
        .route(
            "/{id}",
            get(get_one::<T>)
                .put(put_one::<T>)
                .patch(patch_one::<T>)
                .delete(delete_one::<T>),
        )
        .with_state(ResourceState { store, settings })
}

/// CORS for the given browser origins, or `None` when the list is empty
///
/// Allowed origins may send credentials with any method and headers.
pub fn cors_layer(origins: Vec<HeaderValue>) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}

/// Build the HTTP API router over the given stores.
pub fn build_router(stores: &Stores, config: &ResourcesConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .nest(
            &format!("/{}", BlogPost::collection_name()),
            resource_router(Arc::clone(&stores.blogposts), config.blogposts),
        )
        .nest(
            &format!("/{}", Fruit::collection_name()),
            resource_router(Arc::clone(&stores.fruits), config.fruits),
        )
        .nest(
            &format!("/{}", Task::collection_name()),
            resource_router(Arc::clone(&stores.tasks), config.tasks),
        )
}
