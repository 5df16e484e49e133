pub mod calculations;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod ids;
pub mod logging;
pub mod persistence;
pub mod planner;
pub mod registry;
pub mod reports;
pub mod subject;
pub mod validation;

pub use calculations::{
    GenerationOutcome, RebalanceOutcome, UnallocatedTopic, generate_schedule, reschedule_missed,
};
pub use calendar::DailyUsage;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, PlannerConfig};
pub use entry::ScheduleEntry;
pub use error::{PlannerError, PlannerResult};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlannerStore;
pub use persistence::{
    JsonFilePlannerStore, PersistenceError, PlannerStore, load_planner_from_json,
    load_schedule_from_csv, save_planner_to_json, save_schedule_to_csv,
};
pub use planner::{
    GenerationReport, PlannerState, PlannerSummary, RebalanceReport, StudyPlanner, TimetableDay,
};
pub use registry::SubjectRegistry;
pub use reports::{daily_load_frame, subject_progress_frame};
pub use subject::{Subject, Topic};
pub use validation::ValidationError;
