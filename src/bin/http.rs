#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use study_planner::logging::init_logging;
    use study_planner::{PlannerConfig, StudyPlanner, http_api};

    let config = PlannerConfig::from_env()?;
    let _logger = init_logging(&config.log_spec)?;

    let mut planner = StudyPlanner::new();
    planner.set_daily_hour_budget(config.daily_hours)?;

    #[cfg(feature = "sqlite")]
    let state = match &config.db_path {
        Some(path) => {
            use std::sync::Arc;
            use study_planner::{PlannerStore, SqlitePlannerStore};

            let store = SqlitePlannerStore::new(path)?;
            if let Some(saved) = store.load_state()? {
                planner.restore(saved)?;
                log::info!("restored planner state from {}", path.display());
            }
            http_api::AppState::with_store(planner, Arc::new(store))
        }
        None => http_api::AppState::new(planner),
    };

    #[cfg(not(feature = "sqlite"))]
    let state = {
        if config.db_path.is_some() {
            log::warn!("ignoring database path: built without the `sqlite` feature");
        }
        http_api::AppState::new(planner)
    };

    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
