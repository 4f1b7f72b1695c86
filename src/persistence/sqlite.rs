use super::{PersistenceResult, TimetableStore};
use crate::assignment::CourseAssignment;
use crate::engine::{SyncClient, SyncError};
use crate::grid::SlotIndex;
use crate::substitutes::{SubstituteLog, SubstituteRecord};
use rusqlite::{Connection, params};
use std::sync::Mutex;

/// System-of-record backend over a local sqlite file.
///
/// Rows hold the serialized records as JSON columns; the grid shape is
/// derived, not stored. Whole-timetable saves replace the table inside one
/// transaction; `update_assignment` rewrites a single row, which is what a
/// committed relocation persists.
pub struct SqliteTimetableStore {
    connection: Mutex<Connection>,
}

impl SqliteTimetableStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS assignments (
                id TEXT PRIMARY KEY,
                record_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS substitutes (
                id TEXT PRIMARY KEY,
                record_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    /// Rewrites the stored copy of one assignment after a relocation.
    /// Fails with `NotFound` when the id is unknown to the store.
    pub fn update_assignment(&self, assignment: &CourseAssignment) -> PersistenceResult<()> {
        let json = serde_json::to_string(assignment)?;
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let changed = conn.execute(
            "UPDATE assignments SET record_json = ?2 WHERE id = ?1",
            params![assignment.id, json],
        )?;
        if changed == 0 {
            return Err(super::PersistenceError::NotFound);
        }
        Ok(())
    }

    pub fn save_substitutes(&self, log: &SubstituteLog) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM substitutes", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO substitutes (id, record_json) VALUES (?1, ?2)")?;
            for record in log.records() {
                let json = serde_json::to_string(record)?;
                stmt.execute(params![record.id, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_substitutes(&self) -> PersistenceResult<SubstituteLog> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare("SELECT record_json FROM substitutes ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for json in rows {
            let record: SubstituteRecord = serde_json::from_str(&json?)?;
            records.push(record);
        }
        Ok(SubstituteLog::from_records(records))
    }
}

impl TimetableStore for SqliteTimetableStore {
    fn save_timetable(&self, index: &SlotIndex) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM assignments", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO assignments (id, record_json) VALUES (?1, ?2)")?;
            for assignment in index.assignments() {
                let json = serde_json::to_string(assignment)?;
                stmt.execute(params![assignment.id, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_timetable(&self) -> PersistenceResult<Option<SlotIndex>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut count_stmt = conn.prepare("SELECT COUNT(*) FROM assignments")?;
        let count: i64 = count_stmt.query_row([], |row| row.get(0))?;
        if count == 0 {
            return Ok(None);
        }

        let mut stmt = conn.prepare("SELECT record_json FROM assignments ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut assignments = Vec::new();
        for json in rows {
            let assignment: CourseAssignment = serde_json::from_str(&json?)?;
            assignments.push(assignment);
        }
        Ok(Some(SlotIndex::build(assignments)))
    }
}

// The store doubles as the engine's system of record: a persist is the
// single-row rewrite above. rusqlite is blocking, which is acceptable here;
// a caller fronting a busy runtime should wrap calls in spawn_blocking.
impl SyncClient for SqliteTimetableStore {
    async fn persist(&self, assignment: &CourseAssignment) -> Result<(), SyncError> {
        match self.update_assignment(assignment) {
            Ok(()) => Ok(()),
            Err(super::PersistenceError::NotFound) => Err(SyncError::Rejected(format!(
                "assignment '{}' is not known to the system of record",
                assignment.id
            ))),
            Err(err) => Err(SyncError::Unreachable(err.to_string())),
        }
    }
}
