//! Dashboard aggregation
//!
//! Counts, groupings, and a per-day trend over a rolling window of `days`
//! ending at `now`. Each figure is one aggregate query against the store.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::api::types::{
    DashboardStats, ErrorCount, MessageTypeCount, OperatorCount, OperatorStat,
};
use crate::db::{count_exceptions, count_processed, get_setting_i64};
use crate::time::{start_of_day, to_millis};
use crate::Result;

/// Smallest accepted window
pub const MIN_DAYS: i64 = 1;

/// Largest accepted window
pub const MAX_DAYS: i64 = 365;

const DEFAULT_TOP_ERRORS_LIMIT: i64 = 10;

/// Parse a `days` query parameter
///
/// Non-integers fall back to `default`; the result is clamped to 1..=365.
///
/// # Examples
///
/// ```
/// use payfix_common::dashboard::clamp_days;
///
/// assert_eq!(clamp_days(Some("7"), 30), 7);
/// assert_eq!(clamp_days(Some("abc"), 30), 30);
/// assert_eq!(clamp_days(Some("0"), 30), 1);
/// assert_eq!(clamp_days(Some("9999"), 30), 365);
/// assert_eq!(clamp_days(None, 30), 30);
/// ```
pub fn clamp_days(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
        .clamp(MIN_DAYS, MAX_DAYS)
}

/// Compute dashboard statistics for the `days` ending at `now`
pub async fn dashboard_stats(
    pool: &SqlitePool,
    days: i64,
    now: DateTime<Utc>,
) -> Result<DashboardStats> {
    let days = days.clamp(MIN_DAYS, MAX_DAYS);
    let since = to_millis(now - Duration::days(days));
    let today = to_millis(start_of_day(now));

    let total_exceptions = count_exceptions(pool).await?;
    let total_processed = count_processed(pool).await?;

    let processed_recent_days: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM processed WHERE processed_at >= ?")
            .bind(since)
            .fetch_one(pool)
            .await?;

    let processed_today: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM processed WHERE processed_at >= ?")
            .bind(today)
            .fetch_one(pool)
            .await?;

    let exceptions_by_message_type = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT COALESCE(NULLIF(message_type, ''), '(none)') AS label, COUNT(*) AS total
        FROM exceptions
        GROUP BY label
        ORDER BY total DESC, label
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(message_type, count)| MessageTypeCount {
        message_type,
        count,
    })
    .collect();

    let processed_by_operator = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT COALESCE(NULLIF(processed_by, ''), '(unknown)') AS label, COUNT(*) AS total
        FROM processed
        GROUP BY label
        ORDER BY total DESC, label
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(operator, count)| OperatorCount { operator, count })
    .collect();

    let top_errors_limit =
        get_setting_i64(pool, "top_errors_limit", DEFAULT_TOP_ERRORS_LIMIT).await?;
    let top_errors = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT COALESCE(NULLIF(error, ''), '(none)') AS label, COUNT(*) AS total
        FROM exceptions
        WHERE error IS NOT NULL
        GROUP BY label
        ORDER BY total DESC, label
        LIMIT ?
        "#,
    )
    .bind(top_errors_limit)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(error, count)| ErrorCount { error, count })
    .collect();

    let avg_resolution_ms: Option<f64> = sqlx::query_scalar(
        r#"
        SELECT AVG(processed_at - created_at)
        FROM processed
        WHERE created_at IS NOT NULL AND processed_at >= ?
        "#,
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    let trend_rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT strftime('%Y-%m-%d', created_at / 1000, 'unixepoch') AS day, COUNT(*) AS total
        FROM exceptions
        WHERE created_at >= ?
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let mut exceptions_trend = empty_trend(now, days);
    for (day, count) in trend_rows {
        exceptions_trend.insert(day, count);
    }

    Ok(DashboardStats {
        ok: true,
        generated_at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        total_exceptions,
        total_processed,
        processed_recent_days,
        processed_today,
        avg_resolution_seconds: avg_resolution_ms.map(|ms| ms / 1000.0),
        exceptions_by_message_type,
        processed_by_operator,
        top_errors,
        exceptions_trend,
    })
}

/// Zero-filled trend: one key per calendar day, the last being `now`'s date
fn empty_trend(now: DateTime<Utc>, days: i64) -> BTreeMap<String, i64> {
    (0..days)
        .map(|i| {
            let day = (now - Duration::days(days - 1 - i)).date_naive();
            (day.format("%Y-%m-%d").to_string(), 0)
        })
        .collect()
}

/// Per-operator throughput and average resolution time over all processed records
pub async fn operator_stats(pool: &SqlitePool) -> Result<Vec<OperatorStat>> {
    let rows = sqlx::query_as::<_, (Option<String>, i64, Option<f64>)>(
        r#"
        SELECT processed_by, COUNT(*) AS total, AVG(processed_at - created_at) AS avg_ms
        FROM processed
        GROUP BY processed_by
        ORDER BY total DESC, processed_by
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(operator, count, avg_ms)| OperatorStat {
            operator,
            count,
            avg_resolution_seconds: avg_ms.map(|ms| ms / 1000.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clamp_days_bounds() {
        assert_eq!(clamp_days(Some("1"), 30), 1);
        assert_eq!(clamp_days(Some("365"), 30), 365);
        assert_eq!(clamp_days(Some("366"), 30), 365);
        assert_eq!(clamp_days(Some("-5"), 30), 1);
        assert_eq!(clamp_days(Some(" 14 "), 30), 14);
        assert_eq!(clamp_days(Some("7.5"), 30), 30);
        assert_eq!(clamp_days(Some(""), 30), 30);
    }

    #[test]
    fn test_empty_trend_covers_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();
        let trend = empty_trend(now, 3);

        let keys: Vec<&str> = trend.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2025-02-28", "2025-03-01", "2025-03-02"]);
        assert!(trend.values().all(|&v| v == 0));
    }

    #[test]
    fn test_empty_trend_single_day() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let trend = empty_trend(now, 1);
        assert_eq!(trend.len(), 1);
        assert!(trend.contains_key("2025-01-01"));
    }
}
