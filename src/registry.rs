use crate::constants::SUBJECT_COLORS;
use crate::error::{PlannerError, PlannerResult};
use crate::ids::IdGenerator;
use crate::subject::{Subject, Topic};
use chrono::NaiveDate;
use log::info;

/// Ordered collection of subjects and the topics they own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectRegistry {
    subjects: Vec<Subject>,
}

impl SubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn into_subjects(self) -> Vec<Subject> {
        self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn topic_count(&self) -> usize {
        self.subjects.iter().map(|subject| subject.topics.len()).sum()
    }

    pub fn has_topics(&self) -> bool {
        self.subjects.iter().any(|subject| !subject.topics.is_empty())
    }

    pub fn find(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == subject_id)
    }

    fn find_mut(&mut self, subject_id: &str) -> PlannerResult<&mut Subject> {
        self.subjects
            .iter_mut()
            .find(|subject| subject.id == subject_id)
            .ok_or_else(|| PlannerError::not_found("subject", subject_id))
    }

    /// Color the next registered subject will get.
    pub fn next_color(&self) -> &'static str {
        SUBJECT_COLORS[self.subjects.len() % SUBJECT_COLORS.len()]
    }

    /// Registers a subject. The exam may be today but not earlier.
    pub fn add_subject(
        &mut self,
        name: &str,
        exam_date: NaiveDate,
        today: NaiveDate,
        ids: &mut dyn IdGenerator,
    ) -> PlannerResult<&Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::invalid("subject name", "must not be empty"));
        }
        if exam_date < today {
            return Err(PlannerError::invalid(
                "exam date",
                format!("{exam_date} is before today ({today})"),
            ));
        }

        let subject = Subject::new(ids.next_id(), name, exam_date, self.next_color());
        info!(
            "added subject '{}' ({}) with exam on {}",
            subject.name, subject.id, subject.exam_date
        );
        let idx = self.subjects.len();
        self.subjects.push(subject);
        Ok(&self.subjects[idx])
    }

    pub fn remove_subject(&mut self, subject_id: &str) -> PlannerResult<Subject> {
        let idx = self
            .subjects
            .iter()
            .position(|subject| subject.id == subject_id)
            .ok_or_else(|| PlannerError::not_found("subject", subject_id))?;
        let removed = self.subjects.remove(idx);
        info!("removed subject '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub fn add_topic(
        &mut self,
        subject_id: &str,
        name: &str,
        hours_needed: f64,
        ids: &mut dyn IdGenerator,
    ) -> PlannerResult<&Topic> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::invalid("topic name", "must not be empty"));
        }
        if !hours_needed.is_finite() || hours_needed <= 0.0 {
            return Err(PlannerError::invalid(
                "hours needed",
                format!("{hours_needed} must be a positive number"),
            ));
        }

        let subject = self.find_mut(subject_id)?;
        let topic = Topic::new(ids.next_id(), name, hours_needed);
        info!(
            "added topic '{}' ({}h) to subject '{}'",
            topic.name, topic.hours_needed, subject.name
        );
        subject.topics.push(topic);
        let idx = subject.topics.len() - 1;
        Ok(&subject.topics[idx])
    }

    pub fn remove_topic(&mut self, subject_id: &str, topic_id: &str) -> PlannerResult<Topic> {
        let subject = self.find_mut(subject_id)?;
        let idx = subject
            .topics
            .iter()
            .position(|topic| topic.id == topic_id)
            .ok_or_else(|| PlannerError::not_found("topic", topic_id))?;
        let removed = subject.topics.remove(idx);
        info!(
            "removed topic '{}' from subject '{}'",
            removed.name, subject.name
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn colors_cycle_through_palette() {
        let today = d(2026, 1, 1);
        let mut ids = SequentialIds::new("s");
        let mut registry = SubjectRegistry::new();
        for n in 0..7 {
            registry
                .add_subject(&format!("Subject {n}"), d(2026, 2, 1), today, &mut ids)
                .unwrap();
        }
        assert_eq!(registry.subjects()[0].color, SUBJECT_COLORS[0]);
        assert_eq!(registry.subjects()[5].color, SUBJECT_COLORS[5]);
        assert_eq!(registry.subjects()[6].color, SUBJECT_COLORS[0]);
    }

    #[test]
    fn add_subject_trims_and_validates() {
        let today = d(2026, 1, 10);
        let mut ids = SequentialIds::new("s");
        let mut registry = SubjectRegistry::new();

        let subject = registry
            .add_subject("  Physics ", today, today, &mut ids)
            .unwrap();
        assert_eq!(subject.name, "Physics");

        assert!(matches!(
            registry.add_subject("   ", today, today, &mut ids),
            Err(PlannerError::InvalidInput { .. })
        ));
        assert!(matches!(
            registry.add_subject("Past", d(2026, 1, 9), today, &mut ids),
            Err(PlannerError::InvalidInput { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn topics_are_added_and_removed() {
        let today = d(2026, 1, 10);
        let mut ids = SequentialIds::new("id");
        let mut registry = SubjectRegistry::new();
        let subject_id = registry
            .add_subject("Chemistry", d(2026, 2, 1), today, &mut ids)
            .unwrap()
            .id
            .clone();

        let topic_id = registry
            .add_topic(&subject_id, "Bonds", 3.5, &mut ids)
            .unwrap()
            .id
            .clone();
        assert_eq!(registry.topic_count(), 1);
        assert!(registry.add_topic(&subject_id, "Zero", 0.0, &mut ids).is_err());
        assert_eq!(
            registry.add_topic("missing", "Bonds", 1.0, &mut ids),
            Err(PlannerError::not_found("subject", "missing"))
        );

        let removed = registry.remove_topic(&subject_id, &topic_id).unwrap();
        assert_eq!(removed.name, "Bonds");
        assert!(!registry.has_topics());
    }
}
