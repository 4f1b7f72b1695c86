use crate::assignment::{AssignmentRecord, CourseAssignment};
use crate::slot::SlotKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    AssignmentNotFound { assignment_id: String, slot: SlotKey },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::AssignmentNotFound {
                assignment_id,
                slot,
            } => write!(f, "assignment '{assignment_id}' not found in slot {slot}"),
        }
    }
}

impl std::error::Error for GridError {}

/// The complete mapping from every fixed (day, period) key to the ordered
/// assignments occupying it.
///
/// Every fixed key is present from construction onward, so lookups are
/// total. Within a slot the order is insertion history only; it carries no
/// scheduling meaning. The index is a plain value: relocation computes a
/// successor with [`SlotIndex::with_moved`] and the caller decides whether
/// to keep it, which is what makes rollback a discard rather than an undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SlotIndex {
    slots: BTreeMap<SlotKey, Vec<CourseAssignment>>,
}

// Hand-written so that a grid arriving without its empty slots still
// deserializes into a total index. Occupants are re-grouped under their own
// (day, time), so a payload whose keys disagree with its records cannot
// break the key invariant.
impl<'de> Deserialize<'de> for SlotIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let provided = BTreeMap::<SlotKey, Vec<CourseAssignment>>::deserialize(deserializer)?;
        Ok(SlotIndex::build(provided.into_values().flatten()))
    }
}

impl Default for SlotIndex {
    fn default() -> Self {
        Self {
            slots: SlotKey::all().map(|key| (key, Vec::new())).collect(),
        }
    }
}

impl SlotIndex {
    /// Builds the index by grouping `assignments` on (day, time).
    ///
    /// Input order is preserved within each slot. Typed assignments always
    /// land on a fixed key; raw uploads go through
    /// [`SlotIndex::build_from_uploads`].
    pub fn build<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = CourseAssignment>,
    {
        let mut index = Self::default();
        for assignment in assignments {
            if let Some(occupants) = index.slots.get_mut(&assignment.slot()) {
                occupants.push(assignment);
            }
        }
        index
    }

    /// Builds the index from raw uploaded records. Records whose day or
    /// time does not name a fixed grid coordinate are dropped silently;
    /// the count of dropped records is returned alongside the index.
    pub fn build_from_uploads<I>(records: I) -> (Self, usize)
    where
        I: IntoIterator<Item = AssignmentRecord>,
    {
        let mut dropped = 0;
        let assignments: Vec<CourseAssignment> = records
            .into_iter()
            .filter_map(|record| match record.resolve() {
                Ok(assignment) => Some(assignment),
                Err(_) => {
                    dropped += 1;
                    None
                }
            })
            .collect();
        (Self::build(assignments), dropped)
    }

    /// Occupants of `key`, possibly empty. Total over the fixed key set.
    pub fn get(&self, key: SlotKey) -> &[CourseAssignment] {
        self.slots.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of assignments across all slots.
    pub fn len(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Vec::is_empty)
    }

    /// Iterates slots in grid order (day-major), including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &[CourseAssignment])> {
        self.slots.iter().map(|(key, occupants)| (*key, occupants.as_slice()))
    }

    /// Iterates every assignment in grid order.
    pub fn assignments(&self) -> impl Iterator<Item = &CourseAssignment> {
        self.slots.values().flatten()
    }

    /// Finds the slot currently holding `assignment_id`, if any.
    pub fn locate(&self, assignment_id: &str) -> Option<SlotKey> {
        self.iter().find_map(|(key, occupants)| {
            occupants
                .iter()
                .any(|a| a.id == assignment_id)
                .then_some(key)
        })
    }

    /// Flattens the index back into a record sequence, grid order.
    pub fn to_records(&self) -> Vec<CourseAssignment> {
        self.assignments().cloned().collect()
    }

    /// Returns a new index equal to `self` except that `assignment_id` is
    /// removed from `source` and appended to `target` with its (day, time)
    /// rewritten, together with the relocated record as it now appears in
    /// the target slot. `self` is left untouched.
    pub fn with_moved(
        &self,
        source: SlotKey,
        target: SlotKey,
        assignment_id: &str,
    ) -> Result<(SlotIndex, CourseAssignment), GridError> {
        let position = self
            .get(source)
            .iter()
            .position(|a| a.id == assignment_id)
            .ok_or_else(|| GridError::AssignmentNotFound {
                assignment_id: assignment_id.to_string(),
                slot: source,
            })?;

        let mut successor = self.clone();
        let moved = {
            let occupants = successor
                .slots
                .get_mut(&source)
                .ok_or_else(|| GridError::AssignmentNotFound {
                    assignment_id: assignment_id.to_string(),
                    slot: source,
                })?;
            occupants.remove(position).relocated_to(target)
        };
        if let Some(occupants) = successor.slots.get_mut(&target) {
            occupants.push(moved.clone());
        }
        Ok((successor, moved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Day, Period};

    fn course(id: &str, room: &str, day: Day, time: Period) -> CourseAssignment {
        CourseAssignment::new(id, format!("Course {id}"), format!("Prof {id}"), room, day, time)
    }

    #[test]
    fn default_index_contains_every_fixed_key() {
        let index = SlotIndex::default();
        assert_eq!(index.iter().count(), SlotKey::COUNT);
        assert!(index.is_empty());
    }

    #[test]
    fn build_groups_in_input_order() {
        let mon_nine = SlotKey::new(Day::Mon, Period::Nine);
        let index = SlotIndex::build(vec![
            course("a", "R1", Day::Mon, Period::Nine),
            course("b", "R2", Day::Mon, Period::Nine),
        ]);
        let occupants = index.get(mon_nine);
        assert_eq!(occupants.len(), 2);
        assert_eq!(occupants[0].id, "a");
        assert_eq!(occupants[1].id, "b");
    }

    #[test]
    fn with_moved_leaves_original_untouched() {
        let source = SlotKey::new(Day::Tue, Period::Ten);
        let target = SlotKey::new(Day::Wed, Period::Eleven);
        let index = SlotIndex::build(vec![course("c7", "R1", Day::Tue, Period::Ten)]);

        let (successor, moved) = index.with_moved(source, target, "c7").unwrap();
        assert_eq!(index.get(source).len(), 1);
        assert!(index.get(target).is_empty());
        assert!(successor.get(source).is_empty());
        assert_eq!(successor.get(target)[0], moved);
        assert_eq!(moved.slot(), target);
    }

    #[test]
    fn uploads_outside_the_grid_are_dropped_silently() {
        let mut records: Vec<AssignmentRecord> = vec![
            course("c1", "R1", Day::Mon, Period::Nine).into(),
            course("c2", "R2", Day::Tue, Period::Ten).into(),
        ];
        records[1].day = "Sun".to_string();

        let (index, dropped) = SlotIndex::build_from_uploads(records);
        assert_eq!(dropped, 1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.locate("c1"), Some(SlotKey::new(Day::Mon, Period::Nine)));
        assert_eq!(index.locate("c2"), None);
    }

    #[test]
    fn deserializing_regroups_records_under_their_own_slot() {
        // The record claims Tue-10:00 but arrives under the Mon-9:00 key.
        let payload = r#"{"Mon-9:00":[{"id":"c1","name":"Algorithms","professor":"Prof X","room":"R1","day":"Tue","time":"10:00"}]}"#;
        let index: SlotIndex = serde_json::from_str(payload).unwrap();
        assert!(index.get(SlotKey::new(Day::Mon, Period::Nine)).is_empty());
        assert_eq!(index.locate("c1"), Some(SlotKey::new(Day::Tue, Period::Ten)));
    }

    #[test]
    fn with_moved_unknown_id_fails() {
        let index = SlotIndex::default();
        let err = index
            .with_moved(
                SlotKey::new(Day::Mon, Period::Nine),
                SlotKey::new(Day::Fri, Period::Two),
                "ghost",
            )
            .unwrap_err();
        assert!(matches!(err, GridError::AssignmentNotFound { .. }));
    }
}
