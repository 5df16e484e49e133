use super::{PersistenceError, PersistenceResult, PlannerStore};
use crate::entry::ScheduleEntry;
use crate::planner::PlannerState;
use crate::validation;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub fn save_planner_to_json<P: AsRef<Path>>(state: &PlannerState, path: P) -> PersistenceResult<()> {
    state.validate()?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, state)?;
    debug!("planner state written to {}", path.as_ref().display());
    Ok(())
}

pub fn load_planner_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlannerState> {
    let file = File::open(path)?;
    let state: PlannerState = serde_json::from_reader(file)?;
    state.validate()?;
    Ok(state)
}

/// [`PlannerStore`] over a single JSON snapshot file. A missing file means nothing stored yet.
#[derive(Debug, Clone)]
pub struct JsonFilePlannerStore {
    path: PathBuf,
}

impl JsonFilePlannerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlannerStore for JsonFilePlannerStore {
    fn save_state(&self, state: &PlannerState) -> PersistenceResult<()> {
        save_planner_to_json(state, &self.path)
    }

    fn load_state(&self) -> PersistenceResult<Option<PlannerState>> {
        match load_planner_from_json(&self.path) {
            Ok(state) => Ok(Some(state)),
            Err(PersistenceError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryCsvRecord {
    id: String,
    subject_id: String,
    subject_name: String,
    topic_id: String,
    topic_name: String,
    date: NaiveDate,
    hours: f64,
    completed: bool,
    #[serde(default)]
    color: String,
}

impl From<&ScheduleEntry> for EntryCsvRecord {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id.clone(),
            subject_id: entry.subject_id.clone(),
            subject_name: entry.subject_name.clone(),
            topic_id: entry.topic_id.clone(),
            topic_name: entry.topic_name.clone(),
            date: entry.date,
            hours: entry.hours,
            completed: entry.completed,
            color: entry.color.clone(),
        }
    }
}

impl From<EntryCsvRecord> for ScheduleEntry {
    fn from(record: EntryCsvRecord) -> Self {
        Self {
            id: record.id,
            subject_id: record.subject_id,
            subject_name: record.subject_name,
            topic_id: record.topic_id,
            topic_name: record.topic_name,
            date: record.date,
            hours: record.hours,
            completed: record.completed,
            color: record.color,
        }
    }
}

/// Writes the sessions one per row with a header line.
pub fn save_schedule_to_csv<P: AsRef<Path>>(
    schedule: &[ScheduleEntry],
    path: P,
) -> PersistenceResult<()> {
    validation::validate_collections(&[], schedule)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in schedule {
        writer.serialize(EntryCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_schedule_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<ScheduleEntry>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut schedule = Vec::new();
    for record in reader.deserialize::<EntryCsvRecord>() {
        schedule.push(ScheduleEntry::from(record?));
    }
    validation::validate_collections(&[], &schedule)?;
    Ok(schedule)
}
