use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{delete, get, post},
};
use s3cosi_common::Failure;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::{
    dispatcher::Dispatcher,
    error::ApiError,
    types::{
        CreateBucketRequest, CreateBucketResponse, DeleteBucketRequest, DriverInfo, EmptyResponse,
        GrantBucketAccessRequest, GrantBucketAccessResponse, RevokeBucketAccessRequest,
    },
};

pub fn cosi_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/info", get(driver_info))
        .route("/v1/buckets", post(create_bucket))
        .route("/v1/buckets/{bucket_id}", delete(delete_bucket))
        .route("/v1/buckets/{bucket_id}/access", post(grant_bucket_access))
        .route(
            "/v1/buckets/{bucket_id}/access/{account_id}",
            delete(revoke_bucket_access),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn health() -> &'static str {
    "OK"
}

async fn driver_info(State(dispatcher): State<Arc<Dispatcher>>) -> Json<DriverInfo> {
    Json(dispatcher.driver_info())
}

async fn create_bucket(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<CreateBucketResponse>, ApiError> {
    let request: CreateBucketRequest = parse_body(&body)?;
    Ok(Json(dispatcher.create_bucket(request).await?))
}

async fn delete_bucket(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(bucket_id): Path<String>,
    body: Bytes,
) -> Result<Json<EmptyResponse>, ApiError> {
    let request = DeleteBucketRequest {
        bucket_id,
        ..parse_optional_body::<DeleteBucketRequest>(&body)?
    };
    dispatcher.delete_bucket(request).await?;
    Ok(Json(EmptyResponse {}))
}

async fn grant_bucket_access(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(bucket_id): Path<String>,
    body: Bytes,
) -> Result<Json<GrantBucketAccessResponse>, ApiError> {
    let request = GrantBucketAccessRequest {
        bucket_id,
        ..parse_body::<GrantBucketAccessRequest>(&body)?
    };
    Ok(Json(dispatcher.grant_bucket_access(request).await?))
}

async fn revoke_bucket_access(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path((bucket_id, account_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<EmptyResponse>, ApiError> {
    let request = RevokeBucketAccessRequest {
        bucket_id,
        account_id,
        ..parse_optional_body::<RevokeBucketAccessRequest>(&body)?
    };
    dispatcher.revoke_bucket_access(request).await?;
    Ok(Json(EmptyResponse {}))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError(Failure::invalid_argument(format!("invalid request body: {err}"))))
}

fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}
