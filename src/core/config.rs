use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Bot token
/// Read from TELEGRAM_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("TELEGRAM_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: careerbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "careerbot.log".to_string()));

/// Path to the CSV fallback store
/// Read from USER_DATA_FILE environment variable
/// Used only when the MySQL credentials are absent; unset means persistence
/// is disabled entirely when there is no database.
pub static USER_DATA_FILE: Lazy<Option<String>> = Lazy::new(|| {
    env::var("USER_DATA_FILE")
        .ok()
        .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
});

/// MySQL store configuration (Railway-style variable names)
pub mod mysql {
    use once_cell::sync::Lazy;
    use std::env;

    fn non_empty(name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
    }

    /// Read from MYSQLHOST
    pub static HOST: Lazy<Option<String>> = Lazy::new(|| non_empty("MYSQLHOST"));

    /// Read from MYSQLPORT
    /// Default: 3306
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("MYSQLPORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3306)
    });

    /// Read from MYSQLDATABASE
    pub static DATABASE: Lazy<Option<String>> = Lazy::new(|| non_empty("MYSQLDATABASE"));

    /// Read from MYSQLUSER
    pub static USER: Lazy<Option<String>> = Lazy::new(|| non_empty("MYSQLUSER"));

    /// Read from MYSQLPASSWORD
    pub static PASSWORD: Lazy<Option<String>> = Lazy::new(|| non_empty("MYSQLPASSWORD"));
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of attempts to open a store connection
    pub const CONNECT_MAX_ATTEMPTS: u32 = 3;

    /// Fixed delay between connect attempts (in seconds)
    pub const CONNECT_RETRY_DELAY_SECS: u64 = 2;

    /// Connect retry delay duration
    pub fn connect_delay() -> Duration {
        Duration::from_secs(CONNECT_RETRY_DELAY_SECS)
    }

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

    /// Cap for a single backoff sleep (in seconds)
    pub const MAX_BACKOFF_SECS: u64 = 60;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub(crate) fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Returns true if the given user may run admin commands.
    pub fn is_admin(user_id: i64) -> bool {
        ADMIN_IDS.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_admin_ids_accepts_mixed_separators() {
        let ids = admin::parse_admin_ids("123, 456\n789\t10");
        assert_eq!(ids, vec![123, 456, 789, 10]);
    }

    #[test]
    fn parse_admin_ids_skips_garbage() {
        let ids = admin::parse_admin_ids("abc, 42, ,");
        assert_eq!(ids, vec![42]);
    }

    #[test]
    fn connect_delay_matches_constant() {
        assert_eq!(retry::connect_delay(), Duration::from_secs(2));
    }
}
