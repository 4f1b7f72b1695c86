use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

use crate::{
    AssignmentRecord, CourseAssignment, MoveRequest, RelocationError, SlotIndex, SlotKey,
    SubstituteLog, SubstituteRecord, engine, engine::SyncClient,
};

/// Shared server state: one authoritative slot index, the substitute log,
/// and the sync client standing in for the system of record.
///
/// Relocations are serialized through `relocation_gate` so that each one
/// reads a stable snapshot, computes its successor, and swaps it in only on
/// confirmed commit. Reads never wait on an in-flight persist.
pub struct AppState<C> {
    timetable: Arc<RwLock<SlotIndex>>,
    substitutes: Arc<RwLock<SubstituteLog>>,
    relocation_gate: Arc<AsyncMutex<()>>,
    sync: Arc<C>,
}

// Manual impl: a derived Clone would demand C: Clone, but only the Arcs are
// cloned.
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            timetable: self.timetable.clone(),
            substitutes: self.substitutes.clone(),
            relocation_gate: self.relocation_gate.clone(),
            sync: self.sync.clone(),
        }
    }
}

impl<C> AppState<C> {
    pub fn new(index: SlotIndex, substitutes: SubstituteLog, sync: C) -> Self {
        Self {
            timetable: Arc::new(RwLock::new(index)),
            substitutes: Arc::new(RwLock::new(substitutes)),
            relocation_gate: Arc::new(AsyncMutex::new(())),
            sync: Arc::new(sync),
        }
    }

    pub fn timetable(&self) -> SlotIndex {
        self.timetable.read().clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    SyncFailed(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<RelocationError> for ApiError {
    fn from(value: RelocationError) -> Self {
        match value {
            RelocationError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            RelocationError::Conflict(conflict) => ApiError::Conflict(conflict.to_string()),
            RelocationError::SyncFailed(_) => ApiError::SyncFailed(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::SyncFailed(message) => (StatusCode::BAD_GATEWAY, "sync_failed", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router<C>(state: AppState<C>) -> Router
where
    C: SyncClient + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/timetable", get(get_timetable).put(replace_timetable))
        .route("/timetable/relocate", post(relocate_assignment))
        .route("/substitutes", get(list_substitutes).post(add_substitute))
        .route(
            "/substitutes/:id",
            put(update_substitute).delete(delete_substitute),
        )
        .with_state(state)
}

pub async fn serve<C>(addr: SocketAddr, state: AppState<C>) -> std::io::Result<()>
where
    C: SyncClient + Send + Sync + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_timetable<C>(State(state): State<AppState<C>>) -> Json<SlotIndex> {
    Json(state.timetable.read().clone())
}

#[derive(Debug, Serialize)]
struct ReplaceSummary {
    slots: usize,
    assignments: usize,
    dropped: usize,
}

async fn replace_timetable<C>(
    State(state): State<AppState<C>>,
    Json(records): Json<Vec<AssignmentRecord>>,
) -> Json<ReplaceSummary> {
    // Records arrive raw; out-of-grid ones are dropped, not rejected.
    let (index, dropped) = SlotIndex::build_from_uploads(records);
    let kept = index.len();

    // Wait out any in-flight relocation so its commit cannot swap a
    // successor of the pre-upload grid back in over this replacement.
    let _gate = state.relocation_gate.lock().await;
    *state.timetable.write() = index;
    Json(ReplaceSummary {
        slots: SlotKey::COUNT,
        assignments: kept,
        dropped,
    })
}

#[derive(Debug, Serialize)]
struct SlotView {
    slot: SlotKey,
    occupants: Vec<CourseAssignment>,
}

#[derive(Debug, Serialize)]
struct RelocateResponse {
    assignment: CourseAssignment,
    source: SlotView,
    target: SlotView,
}

async fn relocate_assignment<C>(
    State(state): State<AppState<C>>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<RelocateResponse>, ApiError>
where
    C: SyncClient + Send + Sync + 'static,
{
    // One relocation at a time; the snapshot each one reads stays current
    // until its commit swaps the successor in.
    let _gate = state.relocation_gate.lock().await;
    let snapshot = state.timetable.read().clone();
    let committed = engine::relocate(&snapshot, &request, state.sync.as_ref()).await?;

    // On the source == target no-op the engine skips its own lookup, so the
    // record (if present at all) is still sitting in the source slot.
    let landed = if request.source == request.target {
        request.source
    } else {
        request.target
    };
    let assignment = committed
        .get(landed)
        .iter()
        .find(|a| a.id == request.assignment_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "assignment '{}' not found in slot {landed}",
                request.assignment_id
            ))
        })?;

    let response = RelocateResponse {
        assignment,
        source: slot_view(&committed, request.source),
        target: slot_view(&committed, request.target),
    };
    *state.timetable.write() = committed;
    Ok(Json(response))
}

fn slot_view(index: &SlotIndex, slot: SlotKey) -> SlotView {
    SlotView {
        slot,
        occupants: index.get(slot).to_vec(),
    }
}

#[derive(Debug, Deserialize)]
struct SubstituteFilter {
    date: Option<NaiveDate>,
}

async fn list_substitutes<C>(
    State(state): State<AppState<C>>,
    Query(filter): Query<SubstituteFilter>,
) -> Json<Vec<SubstituteRecord>> {
    let log = state.substitutes.read();
    Json(log.list(filter.date).into_iter().cloned().collect())
}

async fn add_substitute<C>(
    State(state): State<AppState<C>>,
    Json(record): Json<SubstituteRecord>,
) -> (StatusCode, Json<SubstituteRecord>) {
    let mut log = state.substitutes.write();
    let added = log.add(record).clone();
    (StatusCode::CREATED, Json(added))
}

async fn update_substitute<C>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(record): Json<SubstituteRecord>,
) -> Result<Json<SubstituteRecord>, ApiError> {
    let mut log = state.substitutes.write();
    let updated = log
        .update(&id, record)
        .map_err(|err| ApiError::not_found(err.to_string()))?;
    Ok(Json(updated.clone()))
}

async fn delete_substitute<C>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut log = state.substitutes.write();
    log.remove(&id)
        .map_err(|err| ApiError::not_found(err.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
