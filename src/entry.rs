use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One planned study session for a topic on a specific day.
///
/// Subject and topic names are copied in when the session is created, so
/// renaming or removing the source later does not change existing sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub topic_id: String,
    pub topic_name: String,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub completed: bool,
    pub color: String,
}

impl ScheduleEntry {
    /// True for a session that was never completed and whose day is already behind `today`.
    pub fn is_missed(&self, today: NaiveDate) -> bool {
        !self.completed && self.date < today
    }

    /// Same session under a new identity on another day.
    pub fn moved_to(&self, id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, completed: bool) -> ScheduleEntry {
        ScheduleEntry {
            id: "e1".into(),
            subject_id: "s1".into(),
            subject_name: "Math".into(),
            topic_id: "t1".into(),
            topic_name: "Algebra".into(),
            date,
            hours: 2.0,
            completed,
            color: "red".into(),
        }
    }

    #[test]
    fn missed_requires_incomplete_and_past() {
        let today = d(2026, 5, 4);
        assert!(entry(d(2026, 5, 3), false).is_missed(today));
        assert!(!entry(d(2026, 5, 3), true).is_missed(today));
        assert!(!entry(today, false).is_missed(today));
    }

    #[test]
    fn moved_to_keeps_session_details() {
        let original = entry(d(2026, 5, 3), false);
        let moved = original.moved_to("e2", d(2026, 5, 9));
        assert_eq!(moved.id, "e2");
        assert_eq!(moved.date, d(2026, 5, 9));
        assert_eq!(moved.topic_id, original.topic_id);
        assert_eq!(moved.hours, original.hours);
    }
}
