use crate::slot::{Day, Period, SlotKey, SlotParseError};
use serde::{Deserialize, Serialize};

/// One course's placement of {course, professor, room} into a weekly slot.
///
/// Field names match the records produced by the upstream upload pipeline:
/// `time` carries the period label. The `(day, time)` pair always agrees
/// with the slot key the record is stored under; records are never created
/// or destroyed by a relocation, only relabeled and moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAssignment {
    pub id: String,
    pub name: String,
    pub professor: String,
    pub room: String,
    pub day: Day,
    pub time: Period,
}

impl CourseAssignment {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        professor: impl Into<String>,
        room: impl Into<String>,
        day: Day,
        time: Period,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            professor: professor.into(),
            room: room.into(),
            day,
            time,
        }
    }

    pub fn slot(&self) -> SlotKey {
        SlotKey::new(self.day, self.time)
    }

    /// Returns a copy relabeled onto `target`, as a committed relocation
    /// leaves it.
    pub fn relocated_to(&self, target: SlotKey) -> Self {
        let mut moved = self.clone();
        moved.day = target.day;
        moved.time = target.period;
        moved
    }
}

/// An assignment as it arrives from the upload pipeline: `day` and `time`
/// are raw labels that may name coordinates outside the fixed grid. The
/// wire shape is identical to [`CourseAssignment`]; only the typing of the
/// last two fields differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: String,
    pub name: String,
    pub professor: String,
    pub room: String,
    pub day: String,
    pub time: String,
}

impl AssignmentRecord {
    /// Resolves the raw labels against the fixed grid.
    pub fn resolve(self) -> Result<CourseAssignment, SlotParseError> {
        let day = self.day.parse()?;
        let time = self.time.parse()?;
        Ok(CourseAssignment {
            id: self.id,
            name: self.name,
            professor: self.professor,
            room: self.room,
            day,
            time,
        })
    }
}

impl From<CourseAssignment> for AssignmentRecord {
    fn from(value: CourseAssignment) -> Self {
        let day = value.day.to_string();
        let time = value.time.to_string();
        Self {
            id: value.id,
            name: value.name,
            professor: value.professor,
            room: value.room,
            day,
            time,
        }
    }
}
