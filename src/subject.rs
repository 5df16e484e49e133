use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unit of study material that needs a fixed number of hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Total study hours the topic needs. Positive for any topic accepted by the registry.
    pub hours_needed: f64,
}

impl Topic {
    pub fn new(id: impl Into<String>, name: impl Into<String>, hours_needed: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hours_needed,
        }
    }
}

/// A course or exam area with a deadline and an ordered list of topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub exam_date: NaiveDate,
    #[serde(default)]
    pub topics: Vec<Topic>,
    /// Display tag copied onto every session generated for this subject.
    pub color: String,
}

impl Subject {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        exam_date: NaiveDate,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            exam_date,
            topics: Vec::new(),
            color: color.into(),
        }
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    pub fn find_topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == topic_id)
    }

    /// Signed number of days from `today` to the exam. Negative once the exam has passed.
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        (self.exam_date - today).num_days()
    }

    pub fn total_hours_needed(&self) -> f64 {
        self.topics.iter().map(|topic| topic.hours_needed).sum()
    }
}
