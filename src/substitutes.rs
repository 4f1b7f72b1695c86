use crate::slot::SlotKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One substitute-teacher booking: on `date`, `substitute_teacher` covers
/// `course_id` in `slot` for `original_teacher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteRecord {
    #[serde(default = "new_record_id")]
    pub id: String,
    pub date: NaiveDate,
    pub original_teacher: String,
    pub substitute_teacher: String,
    pub course_id: String,
    pub slot: SlotKey,
}

fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstituteError {
    NotFound(String),
}

impl fmt::Display for SubstituteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstituteError::NotFound(id) => write!(f, "substitution '{id}' not found"),
        }
    }
}

impl std::error::Error for SubstituteError {}

/// In-memory log of substitute bookings, insertion-ordered.
///
/// Substitutions have no data dependency on the relocation engine; they are
/// kept alongside the timetable because the same surfaces manage both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstituteLog {
    records: Vec<SubstituteRecord>,
}

impl SubstituteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SubstituteRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends `record`, assigning a fresh id when the caller left it empty.
    pub fn add(&mut self, mut record: SubstituteRecord) -> &SubstituteRecord {
        if record.id.trim().is_empty() {
            record.id = new_record_id();
        }
        self.records.push(record);
        self.records.last().expect("record just pushed")
    }

    /// All records, optionally narrowed to one calendar date.
    pub fn list(&self, date_filter: Option<NaiveDate>) -> Vec<&SubstituteRecord> {
        self.records
            .iter()
            .filter(|record| date_filter.is_none_or(|date| record.date == date))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&SubstituteRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Replaces the record with `id`; the replacement keeps that id.
    pub fn update(
        &mut self,
        id: &str,
        mut replacement: SubstituteRecord,
    ) -> Result<&SubstituteRecord, SubstituteError> {
        let position = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| SubstituteError::NotFound(id.to_string()))?;
        replacement.id = id.to_string();
        self.records[position] = replacement;
        Ok(&self.records[position])
    }

    pub fn remove(&mut self, id: &str) -> Result<SubstituteRecord, SubstituteError> {
        let position = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| SubstituteError::NotFound(id.to_string()))?;
        Ok(self.records.remove(position))
    }

    pub fn records(&self) -> &[SubstituteRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Day, Period};

    fn record(id: &str, date: NaiveDate) -> SubstituteRecord {
        SubstituteRecord {
            id: id.to_string(),
            date,
            original_teacher: "Prof X".into(),
            substitute_teacher: "Prof Y".into(),
            course_id: "c1".into(),
            slot: SlotKey::new(Day::Mon, Period::Nine),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn add_assigns_id_when_missing() {
        let mut log = SubstituteLog::new();
        let added = log.add(record("", d(2025, 9, 1))).clone();
        assert!(!added.id.is_empty());
        assert!(log.find(&added.id).is_some());
    }

    #[test]
    fn list_filters_by_date() {
        let mut log = SubstituteLog::new();
        log.add(record("s1", d(2025, 9, 1)));
        log.add(record("s2", d(2025, 9, 2)));
        assert_eq!(log.list(None).len(), 2);
        let filtered = log.list(Some(d(2025, 9, 2)));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "s2");
    }

    #[test]
    fn update_keeps_the_addressed_id() {
        let mut log = SubstituteLog::new();
        log.add(record("s1", d(2025, 9, 1)));
        let mut replacement = record("something-else", d(2025, 9, 3));
        replacement.substitute_teacher = "Prof Z".into();
        let updated = log.update("s1", replacement).unwrap();
        assert_eq!(updated.id, "s1");
        assert_eq!(updated.substitute_teacher, "Prof Z");
    }

    #[test]
    fn remove_unknown_id_fails() {
        let mut log = SubstituteLog::new();
        assert_eq!(
            log.remove("ghost"),
            Err(SubstituteError::NotFound("ghost".into()))
        );
    }
}
