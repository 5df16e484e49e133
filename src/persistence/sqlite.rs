use super::{PersistenceError, PersistenceResult, PlannerStore};
use crate::entry::ScheduleEntry;
use crate::planner::PlannerState;
use crate::subject::Subject;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::sync::Mutex;

const SUBJECTS_KEY: &str = "subjects";
const SCHEDULE_KEY: &str = "schedule";
const BUDGET_KEY: &str = "dailyHourBudget";

/// Key-value planner store: one JSON document per storage key.
pub struct SqlitePlannerStore {
    connection: Mutex<Connection>,
}

impl SqlitePlannerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS planner_state (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }

    fn put(tx: &rusqlite::Transaction, key: &str, json: &str) -> PersistenceResult<()> {
        tx.execute(
            "INSERT INTO planner_state (key, value_json) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
            params![key, json],
        )?;
        Ok(())
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn save_state(&self, state: &PlannerState) -> PersistenceResult<()> {
        state.validate()?;
        let subjects = serde_json::to_string(&state.subjects)?;
        let schedule = serde_json::to_string(&state.schedule)?;
        let budget = serde_json::to_string(&state.daily_hour_budget)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::put(&tx, SUBJECTS_KEY, &subjects)?;
        Self::put(&tx, SCHEDULE_KEY, &schedule)?;
        Self::put(&tx, BUDGET_KEY, &budget)?;
        tx.commit()?;
        debug!(
            "saved {} subjects and {} sessions to sqlite",
            state.subjects.len(),
            state.schedule.len()
        );
        Ok(())
    }

    fn load_state(&self) -> PersistenceResult<Option<PlannerState>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value_json FROM planner_state")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut values: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (key, json) = row?;
            values.insert(key, json);
        }
        if values.is_empty() {
            return Ok(None);
        }

        let mut state = PlannerState::default();
        if let Some(json) = values.get(SUBJECTS_KEY) {
            state.subjects = serde_json::from_str::<Vec<Subject>>(json)?;
        }
        if let Some(json) = values.get(SCHEDULE_KEY) {
            state.schedule = serde_json::from_str::<Vec<ScheduleEntry>>(json)?;
        }
        if let Some(json) = values.get(BUDGET_KEY) {
            state.daily_hour_budget = serde_json::from_str::<f64>(json)?;
        }
        state.validate()?;
        Ok(Some(state))
    }
}

impl SqlitePlannerStore {
    /// Raw JSON stored under one key, if any.
    pub fn raw_value(&self, key: &str) -> PersistenceResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value_json FROM planner_state WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}
