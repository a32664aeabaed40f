use crate::{
    config::Config,
    services::{
        calendar::{Clock, SystemClock},
        store::PgPeriodStore,
    },
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub periods: Arc<PgPeriodStore>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let clock = Arc::new(SystemClock::with_offset_hours(config.calendar_utc_offset_hours));
        Self::with_clock(db, config, clock)
    }

    pub fn with_clock(db: PgPool, config: Config, clock: Arc<dyn Clock>) -> Self {
        let periods = Arc::new(PgPeriodStore::new(db.clone(), config.subordinate_role.clone()));
        Self {
            db,
            config: Arc::new(config),
            clock,
            periods,
        }
    }
}
