//! MySQL-backed interaction store.
//!
//! Each logical operation opens its own connection (bounded retry, fixed
//! delay), runs inside a transaction where it writes, and closes the
//! connection before returning. Nothing is pooled or cached across calls;
//! concurrent writers for the same user are resolved by the server's own
//! row-level locking (last committed write wins).

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row};
use tokio::time::sleep;

use crate::core::config;
use crate::core::error::{StoreError, StoreResult};
use crate::storage::record::{
    ist_now, FieldUpdate, InteractionEvent, InteractionField, ProfileSnapshot, UserStats, FIELD_DEFAULT,
};

/// Optional detail columns of `telegram_users`, in insert bind order after
/// `user_id, name, username`.
const DETAIL_COLUMN_COUNT: usize = 8;

const CREATE_USERS_SQL: &str = "\
CREATE TABLE IF NOT EXISTS telegram_users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    user_id BIGINT NOT NULL,
    name VARCHAR(255),
    username VARCHAR(255),
    mobile VARCHAR(20),
    email VARCHAR(255),
    challenge_response TEXT,
    clicked_button VARCHAR(255),
    gender VARCHAR(50),
    location VARCHAR(255),
    language VARCHAR(50),
    referral_source VARCHAR(255),
    first_interaction TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    last_interaction TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
    interaction_count INT DEFAULT 1,
    INDEX idx_user_id (user_id),
    INDEX idx_last_interaction (last_interaction)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

const CREATE_LOGS_SQL: &str = "\
CREATE TABLE IF NOT EXISTS telegram_interaction_logs (
    id INT AUTO_INCREMENT PRIMARY KEY,
    user_id BIGINT NOT NULL,
    message_text TEXT,
    bot_response TEXT,
    interaction_type VARCHAR(100),
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    INDEX idx_user_id (user_id),
    INDEX idx_timestamp (timestamp),
    INDEX idx_interaction_type (interaction_type)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

const INSERT_USER_SQL: &str = "\
INSERT INTO telegram_users (
    user_id, name, username, mobile, email, challenge_response,
    clicked_button, gender, location, language, referral_source,
    first_interaction, last_interaction, interaction_count
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_LOG_SQL: &str = "\
INSERT INTO telegram_interaction_logs (user_id, message_text, bot_response, interaction_type, timestamp)
VALUES (?, ?, ?, ?, ?)";

/// Connection parameters for the MySQL store.
///
/// All four credentials must be present; a partial set fails with
/// `ConfigurationMissing` naming the absent variables, and no network
/// attempt is made.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl MysqlConfig {
    /// Reads the Railway-style MYSQL* environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_parts(
            config::mysql::HOST.clone(),
            *config::mysql::PORT,
            config::mysql::DATABASE.clone(),
            config::mysql::USER.clone(),
            config::mysql::PASSWORD.clone(),
        )
    }

    pub(crate) fn from_parts(
        host: Option<String>,
        port: u16,
        database: Option<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> StoreResult<Self> {
        let mut missing = Vec::new();
        if host.is_none() {
            missing.push("MYSQLHOST");
        }
        if database.is_none() {
            missing.push("MYSQLDATABASE");
        }
        if user.is_none() {
            missing.push("MYSQLUSER");
        }
        if password.is_none() {
            missing.push("MYSQLPASSWORD");
        }
        if !missing.is_empty() {
            return Err(StoreError::ConfigurationMissing(missing.join(", ")));
        }
        Ok(Self {
            host: host.unwrap_or_default(),
            port,
            database: database.unwrap_or_default(),
            user: user.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset("utf8mb4")
    }
}

/// MySQL interaction store (upsert table + append-only event log).
pub struct MysqlStore {
    cfg: MysqlConfig,
}

impl MysqlStore {
    pub fn new(cfg: MysqlConfig) -> Self {
        Self { cfg }
    }

    /// Opens a fresh connection, retrying up to
    /// `config::retry::CONNECT_MAX_ATTEMPTS` times with a fixed delay.
    async fn acquire(&self) -> StoreResult<MySqlConnection> {
        let options = self.cfg.connect_options();
        let max_attempts = config::retry::CONNECT_MAX_ATTEMPTS;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match options.connect().await {
                Ok(conn) => return Ok(conn),
                Err(e) if attempt < max_attempts => {
                    log::warn!(
                        "MySQL connect attempt {}/{} failed: {}. Retrying in {}s...",
                        attempt,
                        max_attempts,
                        e,
                        config::retry::CONNECT_RETRY_DELAY_SECS
                    );
                    sleep(config::retry::connect_delay()).await;
                }
                Err(e) => {
                    return Err(StoreError::ConnectionUnavailable {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// Creates both tables and verifies each actually exists afterwards.
    /// Safe to invoke on every start; `CREATE TABLE IF NOT EXISTS` makes the
    /// second and later runs no-ops.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        let result = Self::init_schema(&mut conn).await;
        conn.close().await.ok();
        result
    }

    async fn init_schema(conn: &mut MySqlConnection) -> StoreResult<()> {
        for (table, create_sql) in [
            ("telegram_users", CREATE_USERS_SQL),
            ("telegram_interaction_logs", CREATE_LOGS_SQL),
        ] {
            sqlx::query(create_sql).execute(&mut *conn).await?;

            let present = sqlx::query(&format!("SHOW TABLES LIKE '{table}'"))
                .fetch_optional(&mut *conn)
                .await?;
            if present.is_none() {
                return Err(StoreError::SchemaInitFailed(format!(
                    "table {table} not present after create"
                )));
            }
            log::info!("{} table created/verified", table);
        }
        Ok(())
    }

    /// Insert-or-update the user's record for one interaction.
    ///
    /// Existing record: refresh `name`/`username`/`last_interaction`,
    /// increment `interaction_count`, and set the updated field if one is
    /// named. New record: all detail fields at their defaults,
    /// `first_interaction = last_interaction = now`, count 1. Either path is
    /// a single transaction; failures roll back and surface as `WriteFailed`.
    pub async fn store_interaction(
        &self,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        let result = Self::upsert(&mut conn, snapshot, update).await;
        conn.close().await.ok();
        result.map_err(|e| e.into_write_failed(snapshot.user_id))
    }

    async fn upsert(
        conn: &mut MySqlConnection,
        snapshot: &ProfileSnapshot,
        update: Option<&FieldUpdate>,
    ) -> StoreResult<()> {
        let now = ist_now();
        let mut tx = conn.begin().await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT interaction_count FROM telegram_users WHERE user_id = ?")
                .bind(snapshot.user_id)
                .fetch_optional(&mut *tx)
                .await?;

        match existing {
            Some(count) => {
                let new_count = next_interaction_count(count);
                let sql = update_sql(update.map(|u| u.field));
                let query = sqlx::query(&sql).bind(&snapshot.name).bind(&snapshot.username);
                let query = match update {
                    Some(update) => query.bind(&update.value),
                    None => query,
                };
                query
                    .bind(now)
                    .bind(new_count)
                    .bind(snapshot.user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                let details = detail_columns(update);
                let mut query = sqlx::query(INSERT_USER_SQL)
                    .bind(snapshot.user_id)
                    .bind(&snapshot.name)
                    .bind(&snapshot.username);
                for value in &details {
                    query = query.bind(value);
                }
                query.bind(now).bind(now).bind(1i32).execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;
        log::info!("Stored interaction data for user_id={}", snapshot.user_id);
        Ok(())
    }

    /// Appends one immutable event row to the interaction log. No lookup, no
    /// counters; the complete, order-preserving history lives here.
    pub async fn log_interaction(&self, event: &InteractionEvent) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query(INSERT_LOG_SQL)
            .bind(event.user_id)
            .bind(&event.message_text)
            .bind(&event.bot_response)
            .bind(&event.interaction_type)
            .bind(ist_now())
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(StoreError::from);
        conn.close().await.ok();
        result.map_err(|e| e.into_write_failed(event.user_id))
    }

    /// Reads back one user's record for the admin stats command.
    pub async fn user_stats(&self, user_id: i64) -> StoreResult<Option<UserStats>> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query(
            "SELECT user_id, name, username, interaction_count,
                    first_interaction, last_interaction, challenge_response, clicked_button
             FROM telegram_users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut conn)
        .await;
        conn.close().await.ok();

        let row = match result {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(UserStats {
            user_id: row.try_get("user_id")?,
            name: row
                .try_get("name")
                .unwrap_or_else(|_| FIELD_DEFAULT.to_string()),
            username: row
                .try_get("username")
                .unwrap_or_else(|_| FIELD_DEFAULT.to_string()),
            interaction_count: row.try_get("interaction_count")?,
            first_interaction: row.try_get("first_interaction")?,
            last_interaction: row.try_get("last_interaction")?,
            challenge_response: row
                .try_get("challenge_response")
                .unwrap_or_else(|_| FIELD_DEFAULT.to_string()),
            clicked_button: row
                .try_get("clicked_button")
                .unwrap_or_else(|_| FIELD_DEFAULT.to_string()),
        }))
    }

    /// Total recorded interactions across all users.
    pub async fn total_interactions(&self) -> StoreResult<i64> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(interaction_count), 0) AS SIGNED) FROM telegram_users",
        )
        .fetch_one(&mut conn)
        .await;
        conn.close().await.ok();
        Ok(result?)
    }

    /// Connectivity probe used at startup.
    pub async fn test_connection(&self) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query("SELECT 1").fetch_one(&mut conn).await;
        conn.close().await.ok();
        result?;
        Ok(())
    }
}

fn next_interaction_count(current: i32) -> i32 {
    current + 1
}

/// UPDATE statement for an existing record, with or without an extra field
/// assignment. The column name comes from the closed enum, never from input.
fn update_sql(field: Option<InteractionField>) -> String {
    match field {
        Some(field) => format!(
            "UPDATE telegram_users SET name = ?, username = ?, {} = ?, \
             last_interaction = ?, interaction_count = ? WHERE user_id = ?",
            field.column()
        ),
        None => "UPDATE telegram_users SET name = ?, username = ?, \
                 last_interaction = ?, interaction_count = ? WHERE user_id = ?"
            .to_string(),
    }
}

/// Values for the optional detail columns of a fresh insert: everything at
/// its default, with the one named field (if any) set.
fn detail_columns(update: Option<&FieldUpdate>) -> [String; DETAIL_COLUMN_COUNT] {
    let mut values: [String; DETAIL_COLUMN_COUNT] =
        std::array::from_fn(|_| FIELD_DEFAULT.to_string());
    if let Some(update) = update {
        values[detail_index(update.field)] = update.value.clone();
    }
    values
}

/// Position of each updatable field within the detail columns
/// (`mobile` and `email` occupy 0 and 1; no interaction sets them).
fn detail_index(field: InteractionField) -> usize {
    match field {
        InteractionField::ChallengeResponse => 2,
        InteractionField::ClickedButton => 3,
        InteractionField::Gender => 4,
        InteractionField::Location => 5,
        InteractionField::Language => 6,
        InteractionField::ReferralSource => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn config_reports_every_missing_credential() {
        let err = MysqlConfig::from_parts(None, 3306, None, Some("bot".into()), None)
            .expect_err("partial credentials must fail");
        match err {
            StoreError::ConfigurationMissing(missing) => {
                assert_eq!(missing, "MYSQLHOST, MYSQLDATABASE, MYSQLPASSWORD");
            }
            other => panic!("expected ConfigurationMissing, got {other}"),
        }
    }

    #[test]
    fn config_accepts_complete_credentials() {
        let cfg = MysqlConfig::from_parts(
            Some("db.internal".into()),
            3307,
            Some("railway".into()),
            Some("bot".into()),
            Some("secret".into()),
        )
        .expect("complete credentials");
        assert_eq!(cfg.host, "db.internal");
        assert_eq!(cfg.port, 3307);
    }

    #[test]
    fn interaction_count_increments_by_exactly_one() {
        assert_eq!(next_interaction_count(1), 2);
        assert_eq!(next_interaction_count(41), 42);
    }

    #[test]
    fn update_sql_names_only_the_requested_column() {
        let sql = update_sql(Some(InteractionField::ClickedButton));
        assert!(sql.contains("clicked_button = ?"));
        assert!(!sql.contains("challenge_response"));

        let bare = update_sql(None);
        for field in InteractionField::iter() {
            assert!(!bare.contains(field.column()));
        }
        assert!(bare.contains("interaction_count = ?"));
    }

    #[test]
    fn insert_details_default_to_na() {
        let values = detail_columns(None);
        assert!(values.iter().all(|v| v == FIELD_DEFAULT));
    }

    #[test]
    fn insert_details_set_only_the_named_field() {
        let update = FieldUpdate::clicked_button("Get free PDF");
        let values = detail_columns(Some(&update));
        assert_eq!(values[3], "Get free PDF");
        let untouched = values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .all(|(_, v)| v == FIELD_DEFAULT);
        assert!(untouched);
    }

    #[test]
    fn every_field_has_a_distinct_detail_slot() {
        let mut slots: Vec<usize> = InteractionField::iter().map(detail_index).collect();
        slots.sort_unstable();
        slots.dedup();
        assert_eq!(slots.len(), InteractionField::iter().count());
        assert!(slots.iter().all(|&i| i >= 2 && i < DETAIL_COLUMN_COUNT));
    }
}
