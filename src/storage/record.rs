//! Domain types shared by every store backend: the profile snapshot taken
//! from each message, the closed set of updatable fields, and the fixed-zone
//! timestamp helpers.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use strum::EnumIter;

/// Placeholder stored for every field that no interaction has populated yet.
pub const FIELD_DEFAULT: &str = "N/A";

/// Timestamp format used for all on-disk representations.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Baseline sheet header, in the exact on-disk column order. Existing stores
/// may carry extra columns after these; the baseline set is never removed or
/// reordered.
pub const BASELINE_HEADER: [&str; 12] = [
    "User ID",
    "Name",
    "Username",
    "Timestamp",
    "Mobile",
    "Email",
    "Challenge Response",
    "Clicked Button",
    "Gender",
    "Location",
    "Language",
    "Referral Source",
];

/// India Standard Time (UTC+5:30). All stored timestamps use this zone so
/// the on-disk representation is identical regardless of where the bot runs.
pub static IST: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is in range"));

/// Converts a UTC instant to IST wall-clock time.
pub fn to_ist(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc.with_timezone(&*IST)
}

/// Current IST wall-clock time, as stored in timestamp columns.
pub fn ist_now() -> NaiveDateTime {
    to_ist(Utc::now()).naive_local()
}

/// Current IST time formatted for the sheet store.
pub fn ist_timestamp() -> String {
    ist_now().format(TIMESTAMP_FORMAT).to_string()
}

/// The closed set of per-user fields an interaction may update.
///
/// Each variant resolves to its database column and sheet header at compile
/// time, so there is no unrecognized-key path: a field update that reaches a
/// store always names a real destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum InteractionField {
    ChallengeResponse,
    ClickedButton,
    Gender,
    Location,
    Language,
    ReferralSource,
}

impl InteractionField {
    /// Database column name in `telegram_users`.
    pub fn column(self) -> &'static str {
        match self {
            InteractionField::ChallengeResponse => "challenge_response",
            InteractionField::ClickedButton => "clicked_button",
            InteractionField::Gender => "gender",
            InteractionField::Location => "location",
            InteractionField::Language => "language",
            InteractionField::ReferralSource => "referral_source",
        }
    }

    /// Sheet header cell the field maps to.
    pub fn header(self) -> &'static str {
        match self {
            InteractionField::ChallengeResponse => "Challenge Response",
            InteractionField::ClickedButton => "Clicked Button",
            InteractionField::Gender => "Gender",
            InteractionField::Location => "Location",
            InteractionField::Language => "Language",
            InteractionField::ReferralSource => "Referral Source",
        }
    }
}

/// One (field, value) pair attached to a recorded interaction.
#[derive(Debug, Clone)]
pub struct FieldUpdate {
    pub field: InteractionField,
    pub value: String,
}

impl FieldUpdate {
    pub fn new(field: InteractionField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// The button text a user tapped.
    pub fn clicked_button(value: impl Into<String>) -> Self {
        Self::new(InteractionField::ClickedButton, value)
    }

    /// The challenge option a user selected.
    pub fn challenge_response(value: impl Into<String>) -> Self {
        Self::new(InteractionField::ChallengeResponse, value)
    }
}

/// Identity and display-name snapshot taken from an incoming message.
///
/// `name` and `username` are overwritten on every interaction with the latest
/// observed value; no history is kept.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    /// Telegram chat identifier; the stable unique key for the user record
    pub user_id: i64,
    /// Full display name, or "N/A" when Telegram supplies none
    pub name: String,
    /// Telegram handle, or "N/A" when unset
    pub username: String,
}

impl ProfileSnapshot {
    /// Builds a snapshot from the raw profile parts Telegram supplies.
    pub fn new(
        user_id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Self {
        let name = format!(
            "{} {}",
            first_name.unwrap_or_default(),
            last_name.unwrap_or_default()
        );
        let name = name.trim().to_string();
        Self {
            user_id,
            name: if name.is_empty() {
                FIELD_DEFAULT.to_string()
            } else {
                name
            },
            username: username
                .map(str::to_string)
                .unwrap_or_else(|| FIELD_DEFAULT.to_string()),
        }
    }
}

/// One append-only event row for the detailed interaction log.
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub user_id: i64,
    /// Raw text the user sent
    pub message_text: String,
    /// Short description of what the bot replied with
    pub bot_response: String,
    /// Free-form event category ("command", "button", "challenge")
    pub interaction_type: String,
}

/// Per-user readback from the upsert table, used by the admin stats command.
#[derive(Debug, Clone)]
pub struct UserStats {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub interaction_count: i32,
    pub first_interaction: NaiveDateTime,
    pub last_interaction: NaiveDateTime,
    pub challenge_response: String,
    pub clicked_button: String,
}
