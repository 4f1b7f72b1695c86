use std::sync::Mutex;

use timetable_core::{
    AlwaysAck, ConflictResult, CourseAssignment, MoveRequest, RelocationError, SlotIndex, SlotKey,
    SyncClient, SyncError, relocate,
    slot::{Day, Period},
};

fn course(id: &str, professor: &str, room: &str, day: Day, time: Period) -> CourseAssignment {
    CourseAssignment::new(id, format!("Course {id}"), professor, room, day, time)
}

/// Records every persist it sees and answers with a configured outcome.
struct RecordingClient {
    calls: Mutex<Vec<CourseAssignment>>,
    outcome: Result<(), SyncError>,
}

impl RecordingClient {
    fn acknowledging() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Ok(()),
        }
    }

    fn failing(error: SyncError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Err(error),
        }
    }

    fn calls(&self) -> Vec<CourseAssignment> {
        self.calls.lock().unwrap().clone()
    }
}

impl SyncClient for RecordingClient {
    async fn persist(&self, assignment: &CourseAssignment) -> Result<(), SyncError> {
        self.calls.lock().unwrap().push(assignment.clone());
        self.outcome.clone()
    }
}

fn request(id: &str, source: SlotKey, target: SlotKey) -> MoveRequest {
    MoveRequest {
        source,
        assignment_id: id.to_string(),
        target,
    }
}

#[tokio::test]
async fn same_source_and_target_is_an_identity() {
    let index = SlotIndex::build(vec![course("c1", "Prof X", "R1", Day::Mon, Period::Nine)]);
    let slot = SlotKey::new(Day::Mon, Period::Nine);
    let client = RecordingClient::acknowledging();

    let result = relocate(&index, &request("c1", slot, slot), &client)
        .await
        .unwrap();

    assert_eq!(result, index);
    assert!(client.calls().is_empty(), "no-op must not touch the network");
}

#[tokio::test]
async fn missing_assignment_fails_before_any_network_call() {
    let index = SlotIndex::default();
    let client = RecordingClient::acknowledging();
    let source = SlotKey::new(Day::Mon, Period::Nine);
    let target = SlotKey::new(Day::Tue, Period::Ten);

    let err = relocate(&index, &request("ghost", source, target), &client)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RelocationError::NotFound {
            assignment_id: "ghost".into(),
            slot: source,
        }
    );
    assert!(client.calls().is_empty());
}

// Scenario A: room R1 is booked by Prof X in Mon-9:00; moving Prof Y's R1
// course there reports the room conflict and leaves everything untouched.
#[tokio::test]
async fn room_conflict_blocks_the_move() {
    let index = SlotIndex::build(vec![
        course("c1", "Prof X", "R1", Day::Mon, Period::Nine),
        course("c2", "Prof Y", "R1", Day::Tue, Period::Ten),
    ]);
    let snapshot = index.clone();
    let client = RecordingClient::acknowledging();

    let err = relocate(
        &index,
        &request(
            "c2",
            SlotKey::new(Day::Tue, Period::Ten),
            SlotKey::new(Day::Mon, Period::Nine),
        ),
        &client,
    )
    .await
    .unwrap_err();

    assert_eq!(err, RelocationError::Conflict(ConflictResult::Room("R1".into())));
    assert_eq!(err.to_string(), "Conflict: Room R1 is already booked.");
    assert_eq!(index, snapshot);
    assert!(client.calls().is_empty(), "conflicts are decided locally");
}

#[tokio::test]
async fn room_conflict_takes_precedence_over_teacher_conflict() {
    // Target holds one course sharing the mover's room and another sharing
    // its professor; the report must name the room.
    let index = SlotIndex::build(vec![
        course("c1", "Prof A", "R1", Day::Mon, Period::Nine),
        course("c2", "Prof X", "R9", Day::Mon, Period::Nine),
        course("c3", "Prof X", "R1", Day::Tue, Period::Ten),
    ]);

    let err = relocate(
        &index,
        &request(
            "c3",
            SlotKey::new(Day::Tue, Period::Ten),
            SlotKey::new(Day::Mon, Period::Nine),
        ),
        &AlwaysAck,
    )
    .await
    .unwrap_err();

    assert_eq!(err, RelocationError::Conflict(ConflictResult::Room("R1".into())));
}

#[tokio::test]
async fn teacher_conflict_names_the_professor() {
    let index = SlotIndex::build(vec![
        course("c1", "Prof X", "R1", Day::Mon, Period::Nine),
        course("c2", "Prof X", "R2", Day::Tue, Period::Ten),
    ]);

    let err = relocate(
        &index,
        &request(
            "c2",
            SlotKey::new(Day::Tue, Period::Ten),
            SlotKey::new(Day::Mon, Period::Nine),
        ),
        &AlwaysAck,
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        RelocationError::Conflict(ConflictResult::Teacher("Prof X".into()))
    );
    assert_eq!(
        err.to_string(),
        "Conflict: Prof X is already scheduled at this time."
    );
}

// Scenario B: a clean move into an empty slot commits; the record lands in
// the target with its (day, time) rewritten and leaves the source.
#[tokio::test]
async fn acknowledged_move_commits_the_tentative_index() {
    let source = SlotKey::new(Day::Tue, Period::Ten);
    let target = SlotKey::new(Day::Wed, Period::Eleven);
    let index = SlotIndex::build(vec![course("c7", "Prof W", "R4", Day::Tue, Period::Ten)]);
    let client = RecordingClient::acknowledging();

    let committed = relocate(&index, &request("c7", source, target), &client)
        .await
        .unwrap();

    let landed = &committed.get(target)[0];
    assert_eq!(landed.id, "c7");
    assert_eq!(landed.day, Day::Wed);
    assert_eq!(landed.time, Period::Eleven);
    assert_eq!(landed.room, "R4");
    assert_eq!(landed.professor, "Prof W");
    assert!(committed.get(source).iter().all(|a| a.id != "c7"));

    // The persisted record already carries the new coordinates and is the
    // exact record the committed index holds.
    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].slot(), target);
    assert_eq!(calls[0], committed.get(target)[0]);
}

// Scenario C: the same move against a failing backend reports SyncFailed
// and the caller's index is exactly the pre-move value.
#[tokio::test]
async fn failed_persist_rolls_back_to_the_original_index() {
    let source = SlotKey::new(Day::Tue, Period::Ten);
    let target = SlotKey::new(Day::Wed, Period::Eleven);
    let index = SlotIndex::build(vec![course("c7", "Prof W", "R4", Day::Tue, Period::Ten)]);
    let snapshot = index.clone();
    let client = RecordingClient::failing(SyncError::Unreachable("connection reset".into()));

    let err = relocate(&index, &request("c7", source, target), &client)
        .await
        .unwrap_err();

    assert!(matches!(err, RelocationError::SyncFailed(_)));
    assert_eq!(index, snapshot);
    assert_eq!(index.locate("c7"), Some(source));
    assert!(index.get(target).is_empty());
}

#[tokio::test]
async fn engine_stays_usable_after_a_failure() {
    let source = SlotKey::new(Day::Tue, Period::Ten);
    let target = SlotKey::new(Day::Wed, Period::Eleven);
    let index = SlotIndex::build(vec![course("c7", "Prof W", "R4", Day::Tue, Period::Ten)]);

    let failing = RecordingClient::failing(SyncError::Timeout);
    let request = request("c7", source, target);
    assert!(relocate(&index, &request, &failing).await.is_err());

    // The same request succeeds against a healthy backend.
    let committed = relocate(&index, &request, &AlwaysAck).await.unwrap();
    assert_eq!(committed.locate("c7"), Some(target));
}
