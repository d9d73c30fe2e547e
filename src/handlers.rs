use crate::errors::{AppError, REQUIRED_FIELDS, StoreError};
use crate::models::{CreatedResponse, Entry, EntryFields, EntryPayload, MessageResponse};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::TableView;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Html,
};
use chrono::Local;
use serde::Deserialize;
use tracing::{error, warn};

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    pub q: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let entries = state
        .store
        .list()
        .await
        .map_err(|err| reject("rendering index", err))?;
    let mut view = TableView::with_entries(Local::now().date_naive(), entries);
    if let Some(q) = query.q {
        view.set_filter(q);
    }
    Ok(Html(render_index(&view)))
}

pub async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = state
        .store
        .list()
        .await
        .map_err(|err| reject("listing entries", err))?;
    Ok(Json(entries))
}

pub async fn add_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Json<CreatedResponse>, AppError> {
    let fields = read_payload(payload)?;
    let id = state
        .store
        .create(&fields)
        .await
        .map_err(|err| reject("adding entry", err))?;

    Ok(Json(CreatedResponse {
        message: "Entry saved successfully".to_string(),
        id,
    }))
}

pub async fn update_entry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = read_id(id)?;
    let fields = read_payload(payload)?;
    state
        .store
        .update(id, &fields)
        .await
        .map_err(|err| reject("updating entry", err))?;

    Ok(Json(MessageResponse {
        message: "Entry updated successfully".to_string(),
    }))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = read_id(id)?;
    state
        .store
        .delete(id)
        .await
        .map_err(|err| reject("deleting entry", err))?;

    Ok(Json(MessageResponse {
        message: "Entry deleted successfully".to_string(),
    }))
}

fn read_payload(
    payload: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<EntryFields, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("unreadable entry body: {rejection}");
        AppError::bad_request(REQUIRED_FIELDS).with_details(rejection.body_text())
    })?;
    payload.into_fields().map_err(|err| {
        warn!("entry rejected: {err}");
        AppError::from(err)
    })
}

/// An id that is not an integer cannot match any row.
fn read_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            warn!("bad entry id: {rejection}");
            Err(AppError::not_found())
        }
    }
}

fn reject(action: &str, err: StoreError) -> AppError {
    match &err {
        StoreError::Storage(db) => error!("database error while {action}: {db}"),
        other => warn!("{action} failed: {other}"),
    }
    err.into()
}
