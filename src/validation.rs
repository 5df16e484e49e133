use crate::constants::{HOURS_EPSILON, MAX_DAILY_HOURS, SESSION_CAP_HOURS};
use crate::entry::ScheduleEntry;
use crate::subject::{Subject, Topic};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn validate_daily_budget(hours: f64) -> Result<(), ValidationError> {
    if !hours.is_finite() || hours <= 0.0 || hours > MAX_DAILY_HOURS {
        return Err(ValidationError::new(format!(
            "daily hour budget {hours} must be greater than 0 and at most {MAX_DAILY_HOURS}"
        )));
    }
    Ok(())
}

pub fn validate_topic(topic: &Topic) -> Result<(), ValidationError> {
    if topic.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "topic {} requires a non-empty name",
            topic.id
        )));
    }
    if !topic.hours_needed.is_finite() || topic.hours_needed <= 0.0 {
        return Err(ValidationError::new(format!(
            "topic {} has invalid hours_needed {} (must be positive)",
            topic.id, topic.hours_needed
        )));
    }
    Ok(())
}

pub fn validate_subject(subject: &Subject) -> Result<(), ValidationError> {
    if subject.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "subject {} requires a non-empty name",
            subject.id
        )));
    }
    for topic in &subject.topics {
        validate_topic(topic)?;
    }
    Ok(())
}

pub fn validate_entry(entry: &ScheduleEntry) -> Result<(), ValidationError> {
    if !entry.hours.is_finite() || entry.hours < 0.0 {
        return Err(ValidationError::new(format!(
            "session {} has invalid hours {}",
            entry.id, entry.hours
        )));
    }
    if entry.hours > SESSION_CAP_HOURS + HOURS_EPSILON {
        return Err(ValidationError::new(format!(
            "session {} has {}h, above the {SESSION_CAP_HOURS}h session cap",
            entry.id, entry.hours
        )));
    }
    Ok(())
}

/// Checks subjects, their topics and the schedule for bad values and duplicate ids.
pub fn validate_collections(
    subjects: &[Subject],
    schedule: &[ScheduleEntry],
) -> Result<(), ValidationError> {
    let mut subject_ids = HashSet::with_capacity(subjects.len());
    let mut topic_ids = HashSet::new();
    for subject in subjects {
        if !subject_ids.insert(subject.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate subject id {}",
                subject.id
            )));
        }
        for topic in &subject.topics {
            if !topic_ids.insert(topic.id.as_str()) {
                return Err(ValidationError::new(format!(
                    "duplicate topic id {}",
                    topic.id
                )));
            }
        }
        validate_subject(subject)?;
    }

    let mut entry_ids = HashSet::with_capacity(schedule.len());
    for entry in schedule {
        if !entry_ids.insert(entry.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate session id {}",
                entry.id
            )));
        }
        validate_entry(entry)?;
    }
    Ok(())
}
