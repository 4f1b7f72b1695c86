use super::{PersistenceError, PersistenceResult};
use crate::assignment::{AssignmentRecord, CourseAssignment};
use crate::grid::SlotIndex;
use crate::substitutes::{SubstituteLog, SubstituteRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// On-disk form of a whole session: the flattened assignment records plus
/// the substitute log. Records are stored raw and the slot index is rebuilt
/// on restore, so a hand-edited record that falls outside the grid drops
/// out instead of failing the load.
#[derive(Serialize, Deserialize)]
pub struct TimetableSnapshot {
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub substitutes: Vec<SubstituteRecord>,
}

impl TimetableSnapshot {
    pub fn capture(index: &SlotIndex, substitutes: &SubstituteLog) -> Self {
        Self {
            assignments: index.to_records().into_iter().map(Into::into).collect(),
            substitutes: substitutes.records().to_vec(),
        }
    }

    pub fn restore(self) -> (SlotIndex, SubstituteLog) {
        let (index, _dropped) = SlotIndex::build_from_uploads(self.assignments);
        (index, SubstituteLog::from_records(self.substitutes))
    }
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &TimetableSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TimetableSnapshot> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(file)?;
    Ok(snapshot)
}

// The CSV roster is the flat record sequence the upload pipeline emits:
// id,name,professor,room,day,time. Day and period columns hold the grid
// labels, so CourseAssignment's own serde impls handle them.
pub fn save_assignments_to_csv<P: AsRef<Path>>(
    assignments: &[CourseAssignment],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for assignment in assignments {
        writer.serialize(assignment)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_assignments_from_csv<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<Vec<CourseAssignment>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut assignments = Vec::new();
    for record in reader.deserialize::<AssignmentRecord>() {
        // Rows whose day or time falls outside the grid drop out silently,
        // mirroring index construction. Structural CSV errors still fail.
        if let Ok(assignment) = record?.resolve() {
            assignments.push(assignment);
        }
    }
    if assignments.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no assignments".into(),
        ));
    }
    Ok(assignments)
}
