//! History filtering and time-bound parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::{HistoryEntry, HistoryError};

/// Selection applied to history entries.
///
/// All predicates are combined with AND. Matching entries are sorted newest
/// first, then capped to `last` (`Some(0)` and `None` mean no cap).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct HistoryFilter {
    /// Keep at most this many entries, after sorting.
    pub last: Option<usize>,
    /// Only entries from local midnight through now.
    pub today: bool,
    /// Only failed attempts.
    pub failed: bool,
    /// Only successful attempts.
    pub success: bool,
    /// Only entries at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only entries at or before this instant.
    pub until: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    /// Returns true if the entry passes every predicate.
    ///
    /// `now` supplies both the current instant and the local time zone used
    /// for the "today" predicate.
    #[must_use]
    pub fn matches<Tz: TimeZone>(&self, entry: &HistoryEntry, now: &DateTime<Tz>) -> bool {
        if self.failed && entry.success {
            return false;
        }
        if self.success && !entry.success {
            return false;
        }
        if self.today {
            let now_utc = now.with_timezone(&Utc);
            if entry.timestamp < start_of_day(now) || entry.timestamp > now_utc {
                return false;
            }
        }
        if self.since.is_some_and(|since| entry.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| entry.timestamp > until) {
            return false;
        }
        true
    }

    /// Filters, sorts newest first, and applies the `last` cap.
    #[must_use]
    pub fn apply<Tz: TimeZone>(
        &self,
        entries: Vec<HistoryEntry>,
        now: &DateTime<Tz>,
    ) -> Vec<HistoryEntry> {
        let mut selected: Vec<HistoryEntry> = entries
            .into_iter()
            .filter(|entry| self.matches(entry, now))
            .collect();

        // Stable, so entries with equal timestamps keep their log order
        selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(last) = self.last.filter(|&n| n > 0) {
            selected.truncate(last);
        }
        selected
    }

    /// Short description of the active predicates, e.g. `today, failed`.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.today {
            parts.push("today".to_string());
        }
        if self.failed {
            parts.push("failed".to_string());
        }
        if self.success {
            parts.push("success".to_string());
        }
        if let Some(since) = self.since {
            parts.push(format!("since {}", since.to_rfc3339()));
        }
        if let Some(until) = self.until {
            parts.push(format!("until {}", until.to_rfc3339()));
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Local midnight of `now`'s day, as a UTC instant.
#[must_use]
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let now_utc = now.with_timezone(&Utc);
    let Some(midnight) = now.date_naive().and_hms_opt(0, 0, 0) else {
        return now_utc;
    };

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(
            // No local midnight (DST gap): step back by the elapsed local time
            || now_utc - (now.naive_local() - midnight),
            |start| start.with_timezone(&Utc),
        )
}

/// Parses the lower bound of a time range.
///
/// Accepts an RFC 3339 instant, or a `YYYY-MM-DD` date meaning the start of
/// that day in `tz`.
///
/// # Errors
///
/// Returns [`HistoryError::InvalidTime`] if the value matches neither form.
pub fn parse_since<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Utc>, HistoryError> {
    parse_bound(value, tz, |date| date.and_hms_opt(0, 0, 0))
}

/// Parses the upper bound of a time range.
///
/// Accepts an RFC 3339 instant, or a `YYYY-MM-DD` date meaning the end of
/// that day in `tz`.
///
/// # Errors
///
/// Returns [`HistoryError::InvalidTime`] if the value matches neither form.
pub fn parse_until<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Utc>, HistoryError> {
    parse_bound(value, tz, |date| date.and_hms_nano_opt(23, 59, 59, 999_999_999))
}

fn parse_bound<Tz: TimeZone>(
    value: &str,
    tz: &Tz,
    day_edge: impl FnOnce(NaiveDate) -> Option<NaiveDateTime>,
) -> Result<DateTime<Utc>, HistoryError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(day_edge)
        .and_then(|local| tz.from_local_datetime(&local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| HistoryError::InvalidTime(value.to_string()))
}
