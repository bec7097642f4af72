//! CSV rendering for the attendance and timesheet exports.

use crate::models::{TimesheetDetail, WeeklySummary};
use std::fmt::Write;

/// Quotes a CSV field when it contains a comma, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
    let _ = writeln!(out, "{}", escaped.join(","));
}

/// Renders the weekly attendance summary, one row per employee.
#[must_use]
pub fn weekly_attendance_csv(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "Employee".to_string(),
            "Email".to_string(),
            "Position".to_string(),
            "Department".to_string(),
            "Monday".to_string(),
            "Tuesday".to_string(),
            "Wednesday".to_string(),
            "Thursday".to_string(),
            "Friday".to_string(),
            "Saturday".to_string(),
            "Sunday".to_string(),
            "Total Hours".to_string(),
            "Days Present".to_string(),
        ],
    );
    for row in &summary.employees {
        let h = &row.weekly_hours;
        push_row(
            &mut out,
            &[
                row.employee_name.clone(),
                row.email.clone().unwrap_or_default(),
                row.position.clone().unwrap_or_default(),
                row.department.clone().unwrap_or_default(),
                h.monday.to_string(),
                h.tuesday.to_string(),
                h.wednesday.to_string(),
                h.thursday.to_string(),
                h.friday.to_string(),
                h.saturday.to_string(),
                h.sunday.to_string(),
                row.total_hours.to_string(),
                row.days_present.to_string(),
            ],
        );
    }
    out
}

/// Renders timesheets with one row per entry. Sheets without entries still
/// produce a single row so they show up in the export.
#[must_use]
pub fn timesheets_csv(sheets: &[TimesheetDetail]) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "Date".to_string(),
            "Employee".to_string(),
            "Status".to_string(),
            "Work Order".to_string(),
            "Customer".to_string(),
            "Description".to_string(),
            "Task Code".to_string(),
            "Hours".to_string(),
        ],
    );
    for sheet in sheets {
        let t = &sheet.timesheet;
        if sheet.entries.is_empty() {
            push_row(
                &mut out,
                &[
                    t.work_date.to_string(),
                    t.employee_name.clone(),
                    t.status.clone(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    t.total_hours.to_string(),
                ],
            );
            continue;
        }
        for entry in &sheet.entries {
            push_row(
                &mut out,
                &[
                    t.work_date.to_string(),
                    t.employee_name.clone(),
                    t.status.clone(),
                    entry.work_order.clone().unwrap_or_default(),
                    entry.customer.clone().unwrap_or_default(),
                    entry.description.clone().unwrap_or_default(),
                    entry.task_code.clone().unwrap_or_default(),
                    entry.hours.to_string(),
                ],
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeWeekSummary, Timesheet, TimesheetEntry, WeeklyHours};
    use chrono::Utc;

    #[test]
    fn test_csv_escape_quotes_awkward_fields() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_weekly_csv_shape() {
        let summary = WeeklySummary {
            week_start: "2026-08-24".parse().unwrap(),
            week_end: "2026-08-30".parse().unwrap(),
            employees: vec![EmployeeWeekSummary {
                employee_id: 1,
                employee_name: "Smith, John".to_string(),
                email: Some("john@company.com".to_string()),
                position: None,
                department: None,
                weekly_hours: WeeklyHours {
                    monday: 8.0,
                    ..WeeklyHours::default()
                },
                total_hours: 8.0,
                days_present: 1,
            }],
        };

        let csv = weekly_attendance_csv(&summary);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Employee,Email,Position,Department,Monday"));
        assert!(lines[1].starts_with("\"Smith, John\",john@company.com,,,8"));
        assert!(lines[1].ends_with(",8,1"));
    }

    #[test]
    fn test_timesheets_csv_one_row_per_entry() {
        let now = Utc::now();
        let timesheet = Timesheet {
            id: 1,
            employee_id: None,
            employee_name: "John Smith".to_string(),
            work_date: "2026-08-24".parse().unwrap(),
            shift_time: None,
            total_hours: 8.0,
            status: "draft".to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let entry = |work_order: &str, hours: f64| TimesheetEntry {
            id: 0,
            timesheet_id: 1,
            job_id: None,
            work_order: Some(work_order.to_string()),
            customer: None,
            description: None,
            task_code: None,
            hours,
            created_at: now,
            updated_at: now,
        };

        let with_entries = TimesheetDetail {
            timesheet: timesheet.clone(),
            entries: vec![entry("4363", 5.0), entry("4364", 3.0)],
        };
        let empty = TimesheetDetail {
            timesheet,
            entries: vec![],
        };

        let csv = timesheets_csv(&[with_entries, empty]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4, "header + two entries + one empty sheet");
        assert!(lines[1].contains("4363"));
        assert!(lines[3].ends_with(",8"), "empty sheet falls back to its total");
    }
}
