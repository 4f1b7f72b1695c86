use crate::assignment::CourseAssignment;
use crate::conflict::{self, ConflictResult};
use crate::grid::SlotIndex;
use crate::slot::SlotKey;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One requested relocation, as delivered by the interaction surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub source: SlotKey,
    pub assignment_id: String,
    pub target: SlotKey,
}

/// Why a remote persist did not acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport-level failure; the write may or may not have landed.
    Unreachable(String),
    /// The system of record answered and refused the write.
    Rejected(String),
    Timeout,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Unreachable(reason) => write!(f, "backend unreachable: {reason}"),
            SyncError::Rejected(reason) => write!(f, "backend rejected the update: {reason}"),
            SyncError::Timeout => write!(f, "backend did not answer in time"),
        }
    }
}

impl std::error::Error for SyncError {}

/// The system of record for committed relocations.
///
/// `persist` receives the assignment with its new (day, time) already
/// attached; success is any acknowledged write. The engine never retries a
/// failed persist — retry policy, if any, belongs to the implementation or
/// to the caller.
pub trait SyncClient {
    fn persist(
        &self,
        assignment: &CourseAssignment,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// A client that acknowledges every write. Useful offline and in tests:
/// commits are immediate and nothing is recorded anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAck;

impl SyncClient for AlwaysAck {
    async fn persist(&self, _assignment: &CourseAssignment) -> Result<(), SyncError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationError {
    /// The referenced assignment is not in the source slot. Points at a
    /// desynchronized caller; the index is left intact rather than guessed
    /// at.
    NotFound { assignment_id: String, slot: SlotKey },
    /// Room or teacher exclusivity would be violated; user-recoverable.
    Conflict(ConflictResult),
    /// Local validation passed but the remote write failed; the tentative
    /// index was discarded.
    SyncFailed(SyncError),
}

impl fmt::Display for RelocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelocationError::NotFound {
                assignment_id,
                slot,
            } => write!(f, "assignment '{assignment_id}' not found in slot {slot}"),
            RelocationError::Conflict(conflict) => write!(f, "{conflict}"),
            RelocationError::SyncFailed(reason) => {
                write!(f, "Failed to save changes to the backend: {reason}")
            }
        }
    }
}

impl std::error::Error for RelocationError {}

/// Runs one relocation to completion: validate, compute the tentative
/// successor index, persist, and commit or discard.
///
/// The input index is never mutated. On `Ok` the returned index is the
/// committed successor; on any `Err` the caller's index is still the
/// authoritative state, so rollback is simply not adopting a result.
/// `NotFound` and `Conflict` are decided strictly before any network call.
///
/// A source equal to the target is a no-op and returns an identical index
/// without touching the sync client.
pub async fn relocate<C: SyncClient>(
    index: &SlotIndex,
    request: &MoveRequest,
    client: &C,
) -> Result<SlotIndex, RelocationError> {
    if request.source == request.target {
        return Ok(index.clone());
    }

    let moved = index
        .get(request.source)
        .iter()
        .find(|a| a.id == request.assignment_id)
        .cloned()
        .ok_or_else(|| RelocationError::NotFound {
            assignment_id: request.assignment_id.clone(),
            slot: request.source,
        })?;

    let screening = conflict::check(index.get(request.target), &moved);
    if screening.is_conflict() {
        return Err(RelocationError::Conflict(screening));
    }

    // Optimistic successor; the caller may render this while the persist is
    // outstanding, as long as it adopts it only on Ok. The persisted record
    // is the one the successor holds, so the two cannot drift.
    let (tentative, relocated) = index
        .with_moved(request.source, request.target, &request.assignment_id)
        .map_err(|_| RelocationError::NotFound {
            assignment_id: request.assignment_id.clone(),
            slot: request.source,
        })?;

    match client.persist(&relocated).await {
        Ok(()) => {
            debug!(
                "committed relocation of '{}' from {} to {}",
                request.assignment_id, request.source, request.target
            );
            Ok(tentative)
        }
        Err(reason) => {
            warn!(
                "rolled back relocation of '{}' from {} to {}: {reason}",
                request.assignment_id, request.source, request.target
            );
            Err(RelocationError::SyncFailed(reason))
        }
    }
}
