pub mod activity;
pub mod aggregate;
pub mod completions;
pub mod profile;
pub mod quests;
pub mod types;

use chrono::NaiveDate;

/// Current UTC timestamp in RFC 3339, the format every table stores.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Today's civil date (UTC).
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
