//! Plain-text rendering for the terminal
//!
//! Tables, record details, and horizontal bar charts. Everything here returns
//! a `String` so output can be checked without a terminal.

use payfix_common::api::{DashboardStats, OperatorStat};
use payfix_common::{AuditEntry, ExceptionRecord, ProcessedRecord};
use serde_json::Value;

use crate::editor::{current_value, EDITABLE_FIELDS};

/// Width of the longest bar in a chart
pub const BAR_WIDTH: usize = 40;

const BAR_CHAR: char = '█';

/// Keys added when a record is processed; not operator changes
const PROCESSING_KEYS: [&str; 3] = ["processed_at", "processed_by", "source_id"];

// ========================================
// Queue
// ========================================

/// Exception queue table: ID, Sender, Receiver, Beneficiary, Amount, Error
pub fn exceptions_table(records: &[ExceptionRecord]) -> String {
    if records.is_empty() {
        return "No exceptions in queue".to_string();
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let tx = &r.transaction;
            vec![
                r.id.clone(),
                tx.sender.clone().unwrap_or_default(),
                tx.receiver.clone().unwrap_or_default(),
                tx.beneficiary_name.clone().unwrap_or_default(),
                tx.amount.clone().unwrap_or_default(),
                tx.error.clone().unwrap_or_default(),
            ]
        })
        .collect();

    table(
        &["ID", "Sender", "Receiver", "Beneficiary", "Amount", "Error"],
        &rows,
    )
}

/// Full view of one queued exception
pub fn exception_detail(record: &ExceptionRecord) -> String {
    let tx = &record.transaction;
    let mut lines = vec![format!("{:<12} {}", "ID:", record.id)];

    for (key, label) in EDITABLE_FIELDS {
        lines.push(format!("{:<12} {}", format!("{}:", label), current_value(tx, key)));
    }
    lines.push(format!(
        "{:<12} {}",
        "Error:",
        tx.error.as_deref().unwrap_or_default()
    ));
    if let Some(created_at) = tx.created_at {
        lines.push(format!("{:<12} {}", "Created:", created_at.to_rfc3339()));
    }

    if let Some(errors) = &record.last_error {
        lines.push("Last fix rejected:".to_string());
        lines.extend(errors.iter().map(|e| format!("  - {}", e)));
    }
    if let (Some(by), Some(at)) = (&record.last_modified_by, record.last_modified_at) {
        lines.push(format!("Last modified by {} at {}", by, at.to_rfc3339()));
    }

    if !tx.extra.is_empty() {
        lines.push("Other fields:".to_string());
        lines.extend(
            tx.extra
                .iter()
                .map(|(k, v)| format!("  {}: {}", k, display_value(v))),
        );
    }

    lines.join("\n")
}

/// One line per processed record: `operator | MT | beneficiary | amount currency`
pub fn processed_lines(records: &[ProcessedRecord]) -> String {
    if records.is_empty() {
        return "No processed transactions".to_string();
    }

    records
        .iter()
        .map(|r| {
            let tx = &r.transaction;
            format!(
                "{} | {} | {} | {} {}",
                r.processed_by,
                tx.message_type.as_deref().unwrap_or_default(),
                tx.beneficiary_name.as_deref().unwrap_or_default(),
                tx.amount.as_deref().unwrap_or_default(),
                tx.currency.as_deref().unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Audit trail with the fields each fix changed
pub fn audit_entries(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries".to_string();
    }

    let mut lines = Vec::new();
    for entry in entries {
        lines.push(format!(
            "{}  {}  {}",
            entry.timestamp.to_rfc3339(),
            entry.operator,
            entry.tx_id
        ));

        let changes = changed_fields(&entry.before, &entry.after);
        if changes.is_empty() {
            lines.push("    (no field changes)".to_string());
        }
        lines.extend(changes.into_iter().map(|c| format!("    {}", c)));
    }

    lines.join("\n")
}

/// `field: old -> new` for every key whose value differs
fn changed_fields(before: &Value, after: &Value) -> Vec<String> {
    let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
        return Vec::new();
    };

    after
        .iter()
        .filter(|(key, _)| !PROCESSING_KEYS.contains(&key.as_str()))
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| {
            let old = before
                .get(key)
                .map(display_value)
                .unwrap_or_else(|| "(absent)".to_string());
            format!("{}: {} -> {}", key, old, display_value(value))
        })
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

// ========================================
// Dashboard
// ========================================

/// Dashboard: counters, groupings as bar charts, and the per-day trend
///
/// `days` is the window asked for; without it the service default applied
/// and the labels leave the length out.
pub fn dashboard(stats: &DashboardStats, days: Option<i64>) -> String {
    let window = days.map(|d| d.clamp(1, 365));
    let avg = stats
        .avg_resolution_seconds
        .map(format_duration)
        .unwrap_or_else(|| "n/a".to_string());

    let mut sections = vec![[
        format!("Dashboard (generated {})", stats.generated_at),
        format!("  {:<26} {}", "Total exceptions:", stats.total_exceptions),
        format!("  {:<26} {}", "Total processed:", stats.total_processed),
        format!(
            "  {:<26} {}",
            match window {
                Some(d) => format!("Processed (last {} days):", d),
                None => "Processed (recent):".to_string(),
            },
            stats.processed_recent_days
        ),
        format!("  {:<26} {}", "Processed today:", stats.processed_today),
        format!("  {:<26} {}", "Avg resolution time:", avg),
    ]
    .join("\n")];

    sections.push(bar_chart(
        "Exceptions by message type",
        &stats
            .exceptions_by_message_type
            .iter()
            .map(|c| (c.message_type.clone(), c.count))
            .collect::<Vec<_>>(),
    ));
    sections.push(bar_chart(
        "Processed by operator",
        &stats
            .processed_by_operator
            .iter()
            .map(|c| (c.operator.clone(), c.count))
            .collect::<Vec<_>>(),
    ));
    sections.push(bar_chart(
        "Top errors",
        &stats
            .top_errors
            .iter()
            .map(|c| (c.error.clone(), c.count))
            .collect::<Vec<_>>(),
    ));
    sections.push(bar_chart(
        &match window {
            Some(d) => format!("Exceptions trend (last {} days)", d),
            None => "Exceptions trend".to_string(),
        },
        &stats
            .exceptions_trend
            .iter()
            .map(|(day, count)| (day.clone(), *count))
            .collect::<Vec<_>>(),
    ));

    sections.join("\n\n")
}

/// Horizontal bar chart scaled to the largest count
pub fn bar_chart(title: &str, rows: &[(String, i64)]) -> String {
    let mut lines = vec![title.to_string()];

    if rows.is_empty() {
        lines.push("  (none)".to_string());
        return lines.join("\n");
    }

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);

    for (label, count) in rows {
        let bar: String = std::iter::repeat(BAR_CHAR)
            .take(bar_len(*count, max))
            .collect();
        if bar.is_empty() {
            lines.push(format!("  {:<label_width$}  {}", label, count));
        } else {
            lines.push(format!("  {:<label_width$}  {} {}", label, bar, count));
        }
    }

    lines.join("\n")
}

fn bar_len(count: i64, max: i64) -> usize {
    if count <= 0 || max <= 0 {
        return 0;
    }
    let len = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    len.max(1)
}

/// Per-operator throughput table
pub fn operator_stats(stats: &[OperatorStat]) -> String {
    if stats.is_empty() {
        return "No processed transactions".to_string();
    }

    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            vec![
                s.operator.clone().unwrap_or_else(|| "(unknown)".to_string()),
                s.count.to_string(),
                s.avg_resolution_seconds
                    .map(format_duration)
                    .unwrap_or_else(|| "n/a".to_string()),
            ]
        })
        .collect();

    table(&["Operator", "Processed", "Avg resolution"], &rows)
}

/// Compact duration: `45s`, `3m 20s`, `2h 5m`, `1d 4h`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.round().max(0.0) as i64
    } else {
        0
    };

    let (days, hours, minutes, secs) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

// ========================================
// Tables
// ========================================

/// Left-aligned columns separated by two spaces
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![format_row(headers.to_vec()), separator];
    lines.extend(
        rows.iter()
            .map(|row| format_row(row.iter().map(String::as_str).collect())),
    );

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use payfix_common::api::{ErrorCount, MessageTypeCount, OperatorCount};
    use payfix_common::Transaction;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn exception(id: &str, sender: &str) -> ExceptionRecord {
        ExceptionRecord {
            id: id.to_string(),
            transaction: Transaction {
                sender: Some(sender.to_string()),
                receiver: Some("XYZ BANK".to_string()),
                beneficiary_name: Some("Johnathan Will...".to_string()),
                amount: Some("5000".to_string()),
                error: Some("Field 59 truncated".to_string()),
                ..Default::default()
            },
            last_error: None,
            last_modified_by: None,
            last_modified_at: None,
        }
    }

    #[test]
    fn test_exceptions_table_layout() {
        let out = exceptions_table(&[exception("a1", "ABC BANK"), exception("b2", "SOME BANK")]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  Sender     Receiver"));
        assert!(lines[1].starts_with("--  ---------  --------"));
        assert!(lines[2].starts_with("a1  ABC BANK   XYZ BANK"));
        assert!(lines[3].ends_with("Field 59 truncated"));
    }

    #[test]
    fn test_empty_queue() {
        assert_eq!(exceptions_table(&[]), "No exceptions in queue");
    }

    #[test]
    fn test_processed_lines() {
        let record = ProcessedRecord {
            id: "p1".to_string(),
            transaction: Transaction {
                message_type: Some("MT103".to_string()),
                beneficiary_name: Some("Johnathan Williams".to_string()),
                amount: Some("5000".to_string()),
                currency: Some("USD".to_string()),
                ..Default::default()
            },
            source_id: Some("a1".to_string()),
            processed_at: Utc::now(),
            processed_by: "operator1".to_string(),
        };

        assert_eq!(
            processed_lines(&[record]),
            "operator1 | MT103 | Johnathan Williams | 5000 USD"
        );
        assert_eq!(processed_lines(&[]), "No processed transactions");
    }

    #[test]
    fn test_bar_chart_scaled_to_max() {
        let out = bar_chart(
            "Top errors",
            &[("E1".to_string(), 4), ("E22".to_string(), 1), ("E3".to_string(), 0)],
        );
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Top errors");
        assert_eq!(lines[1], format!("  E1   {} 4", "█".repeat(BAR_WIDTH)));
        assert_eq!(lines[2], format!("  E22  {} 1", "█".repeat(BAR_WIDTH / 4)));
        assert_eq!(lines[3], "  E3   0");
    }

    #[test]
    fn test_bar_chart_empty() {
        assert_eq!(bar_chart("Top errors", &[]), "Top errors\n  (none)");
    }

    #[test]
    fn test_small_counts_still_visible() {
        assert_eq!(bar_len(1, 1000), 1);
        assert_eq!(bar_len(0, 10), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45.4), "45s");
        assert_eq!(format_duration(200.0), "3m 20s");
        assert_eq!(format_duration(10_800.0), "3h 0m");
        assert_eq!(format_duration(100_000.0), "1d 3h");
        assert_eq!(format_duration(-5.0), "0s");
        assert_eq!(format_duration(f64::NAN), "0s");
    }

    #[test]
    fn test_dashboard_sections() {
        let mut trend = BTreeMap::new();
        trend.insert("2025-03-09".to_string(), 0);
        trend.insert("2025-03-10".to_string(), 2);

        let stats = DashboardStats {
            ok: true,
            generated_at: "2025-03-10T12:00:00.000000Z".to_string(),
            total_exceptions: 2,
            total_processed: 1,
            processed_recent_days: 1,
            processed_today: 1,
            avg_resolution_seconds: Some(10_800.0),
            exceptions_by_message_type: vec![MessageTypeCount {
                message_type: "MT103".to_string(),
                count: 2,
            }],
            processed_by_operator: vec![OperatorCount {
                operator: "alice".to_string(),
                count: 1,
            }],
            top_errors: vec![ErrorCount {
                error: "E1".to_string(),
                count: 2,
            }],
            exceptions_trend: trend,
        };

        let out = dashboard(&stats, Some(2));

        assert!(out.contains("Processed (last 2 days):"));
        assert!(out.contains("Avg resolution time:       3h 0m"));
        assert!(out.contains("Exceptions by message type\n  MT103"));
        assert!(out.contains("Processed by operator\n  alice"));
        assert!(out.contains("Exceptions trend (last 2 days)\n  2025-03-09  0\n  2025-03-10"));

        // An extra earlier trend day does not change the window
        let mut stats = stats;
        stats.exceptions_trend.insert("2025-03-08".to_string(), 1);
        let out = dashboard(&stats, Some(2));
        assert!(out.contains("Processed (last 2 days):"));
        assert!(out.contains("Exceptions trend (last 2 days)\n  2025-03-08"));

        let out = dashboard(&stats, None);
        assert!(out.contains("Processed (recent):"));
        assert!(out.contains("Exceptions trend\n  2025-03-08"));
        assert!(!out.contains("last 3 days"));
    }

    #[test]
    fn test_audit_shows_changed_fields() {
        let entry = AuditEntry {
            id: "x".to_string(),
            tx_id: "a1".to_string(),
            operator: "operator1".to_string(),
            before: json!({"beneficiary_name": "Johnathan Will...", "amount": "5000"}),
            after: json!({
                "beneficiary_name": "Johnathan Williams",
                "amount": "5000",
                "processed_by": "operator1",
                "processed_at": "2025-03-10T12:00:00Z",
            }),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(),
        };

        let out = audit_entries(&[entry]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2025-03-10T12:00:00+00:00  operator1  a1");
        assert_eq!(
            lines[1],
            r#"    beneficiary_name: "Johnathan Will..." -> "Johnathan Williams""#
        );
    }
}
