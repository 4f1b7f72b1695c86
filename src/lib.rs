pub mod assignment;
pub mod conflict;
pub mod engine;
pub mod grid;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod slot;
pub mod substitutes;

pub use assignment::{AssignmentRecord, CourseAssignment};
pub use conflict::{ConflictResult, check};
pub use engine::{AlwaysAck, MoveRequest, RelocationError, SyncClient, SyncError, relocate};
pub use grid::{GridError, SlotIndex};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTimetableStore;
pub use persistence::{
    PersistenceError, TimetableSnapshot, TimetableStore, load_assignments_from_csv,
    load_snapshot_from_json, save_assignments_to_csv, save_snapshot_to_json,
};
pub use slot::{Day, Period, SlotKey, SlotParseError};
pub use substitutes::{SubstituteError, SubstituteLog, SubstituteRecord};
