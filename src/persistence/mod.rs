use crate::planner::PlannerState;
use crate::validation::ValidationError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Whole-state storage: read everything at session start, write everything after each change.
pub trait PlannerStore {
    fn save_state(&self, state: &PlannerState) -> PersistenceResult<()>;
    fn load_state(&self) -> PersistenceResult<Option<PlannerState>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonFilePlannerStore, load_planner_from_json, load_schedule_from_csv, save_planner_to_json,
    save_schedule_to_csv,
};
