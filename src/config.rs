use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout_secs: u64,
    /// Offset of the reporting wall clock from UTC, in hours (EAT = +3)
    pub calendar_utc_offset_hours: i32,
    pub rollover_interval_secs: u64,
    /// Users with this role receive a report shell for every new period
    pub subordinate_role: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let config = Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a valid port number"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("DATABASE_MAX_CONNECTIONS must be a number"),
            database_acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number"),
            calendar_utc_offset_hours: env::var("CALENDAR_UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("CALENDAR_UTC_OFFSET_HOURS must be a whole number of hours"),
            rollover_interval_secs: env::var("ROLLOVER_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .expect("ROLLOVER_INTERVAL_SECS must be a number"),
            subordinate_role: env::var("SUBORDINATE_ROLE")
                .unwrap_or_else(|_| "branch_user".to_string()),
        };

        if let Err(msg) = config.validate() {
            panic!("{}", msg);
        }
        config
    }

    /// Range checks that parsing alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(-12..=14).contains(&self.calendar_utc_offset_hours) {
            return Err(format!(
                "CALENDAR_UTC_OFFSET_HOURS must be between -12 and 14, got {}",
                self.calendar_utc_offset_hours
            ));
        }
        if self.rollover_interval_secs == 0 {
            return Err("ROLLOVER_INTERVAL_SECS must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: "postgres://localhost/planning_calendar_test".to_string(),
            database_max_connections: 1,
            database_acquire_timeout_secs: 1,
            calendar_utc_offset_hours: 3,
            rollover_interval_secs: 3600,
            subordinate_role: "branch_user".to_string(),
        }
    }
}
