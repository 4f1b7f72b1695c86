use crate::assignment::CourseAssignment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of screening a proposed relocation against a target slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "resource", rename_all = "snake_case")]
pub enum ConflictResult {
    NoConflict,
    /// The target slot already holds a course in this room.
    Room(String),
    /// The target slot already holds a course taught by this professor.
    Teacher(String),
}

impl ConflictResult {
    pub fn is_conflict(&self) -> bool {
        !matches!(self, ConflictResult::NoConflict)
    }
}

impl fmt::Display for ConflictResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictResult::NoConflict => write!(f, "no conflict"),
            ConflictResult::Room(room) => {
                write!(f, "Conflict: Room {room} is already booked.")
            }
            ConflictResult::Teacher(professor) => {
                write!(f, "Conflict: {professor} is already scheduled at this time.")
            }
        }
    }
}

/// Screens `moved` against the current occupants of its target slot.
///
/// Room exclusivity is checked before professor exclusivity, so when one
/// occupant shares the room and another shares the professor the result is
/// the room conflict. An occupant that *is* the moved assignment (same id,
/// already in the target) is not special-cased: it shares both room and
/// professor and reports as an ordinary room conflict.
pub fn check(occupants: &[CourseAssignment], moved: &CourseAssignment) -> ConflictResult {
    if occupants.iter().any(|c| c.room == moved.room) {
        return ConflictResult::Room(moved.room.clone());
    }
    if occupants.iter().any(|c| c.professor == moved.professor) {
        return ConflictResult::Teacher(moved.professor.clone());
    }
    ConflictResult::NoConflict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Day, Period};

    fn course(id: &str, professor: &str, room: &str) -> CourseAssignment {
        CourseAssignment::new(id, "Algorithms", professor, room, Day::Mon, Period::Nine)
    }

    #[test]
    fn empty_slot_never_conflicts() {
        let moved = course("c1", "Prof X", "R1");
        assert_eq!(check(&[], &moved), ConflictResult::NoConflict);
    }

    #[test]
    fn room_conflict_wins_over_teacher_conflict() {
        let occupants = vec![
            course("c2", "Prof Other", "R1"),
            course("c3", "Prof X", "R9"),
        ];
        let moved = course("c1", "Prof X", "R1");
        assert_eq!(check(&occupants, &moved), ConflictResult::Room("R1".into()));
    }

    #[test]
    fn teacher_conflict_when_rooms_differ() {
        let occupants = vec![course("c2", "Prof X", "R5")];
        let moved = course("c1", "Prof X", "R1");
        assert_eq!(
            check(&occupants, &moved),
            ConflictResult::Teacher("Prof X".into())
        );
    }

    #[test]
    fn conflict_messages_name_the_resource() {
        assert_eq!(
            ConflictResult::Room("R1".into()).to_string(),
            "Conflict: Room R1 is already booked."
        );
        assert_eq!(
            ConflictResult::Teacher("Prof X".into()).to_string(),
            "Conflict: Prof X is already scheduled at this time."
        );
    }
}
