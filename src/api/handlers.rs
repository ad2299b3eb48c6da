//! Route handlers
//!
//! Handlers parse input, call the catalog and shape the response. They hold
//! no logic of their own beyond translating "no such song" into a 404.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::api::params::{
    DetailsParams, IdParams, ListSongsParams, NewSong, SongDetails, SongPayload, VersesParams,
};
use crate::api::response::ApiError;
use crate::api::AppState;
use crate::core::models::SongDraft;

fn query<T>(extracted: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    extracted
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn body<T>(extracted: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    extracted.map(|Json(payload)| payload).map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected request body");
        ApiError::bad_request(format!("unmarshal: {}", rejection.body_text()))
    })
}

/// `GET /songs`
pub async fn list_songs(
    State(state): State<AppState>,
    params: Result<Query<ListSongsParams>, QueryRejection>,
) -> Result<Json<Vec<SongPayload>>, ApiError> {
    let criteria = query(params)?.into_criteria()?;
    let songs = state.catalog.list_songs(criteria).await?;
    Ok(Json(songs.into_iter().map(SongPayload::from).collect()))
}

/// `POST /songs`
pub async fn create_songs(
    State(state): State<AppState>,
    payload: Result<Json<Vec<NewSong>>, JsonRejection>,
) -> Result<Json<Vec<SongPayload>>, ApiError> {
    let drafts = body(payload)?.into_iter().map(SongDraft::from).collect();
    let songs = state.catalog.create_songs(drafts).await?;
    Ok(Json(songs.into_iter().map(SongPayload::from).collect()))
}

/// `PUT /songs`
pub async fn update_song(
    State(state): State<AppState>,
    payload: Result<Json<SongPayload>, JsonRejection>,
) -> Result<Json<SongPayload>, ApiError> {
    let update = body(payload)?.into_update()?;
    let submitted = state.catalog.update_song(update).await?;
    Ok(Json(SongPayload::from(submitted)))
}

/// `DELETE /songs`
pub async fn delete_song(
    State(state): State<AppState>,
    params: Result<Query<IdParams>, QueryRejection>,
) -> Result<Json<i64>, ApiError> {
    let id = query(params)?.song_id()?;
    let deleted = state.catalog.delete_song(id).await?;
    Ok(Json(deleted.get()))
}

/// `GET /info`
pub async fn song_details(
    State(state): State<AppState>,
    params: Result<Query<DetailsParams>, QueryRejection>,
) -> Result<Json<SongDetails>, ApiError> {
    let (group, song) = query(params)?.into_key()?;
    match state.catalog.get_details(&group, &song).await? {
        Some(found) => Ok(Json(SongDetails::from(found))),
        None => Err(ApiError::not_found("Song not found")),
    }
}

/// `GET /text`
pub async fn song_text(
    State(state): State<AppState>,
    params: Result<Query<VersesParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let (id, page) = query(params)?.into_request()?;
    let verses = state.catalog.get_verses(id, page).await?;
    Ok(Json(verses))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
