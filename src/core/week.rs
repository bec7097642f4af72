//! Folds raw attendance rows into the per-employee weekly summary.

use crate::models::{AttendanceRecord, Employee, EmployeeWeekSummary, WeeklyHours, WeeklySummary};
use chrono::{Datelike, Days, NaiveDate};

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Builds the weekly summary for every listed employee. Each employee gets a
/// row even with no attendance; days without a record stay at 0 hours. Only
/// days with status `present` or `partial` count toward `days_present`.
#[must_use]
pub fn build_weekly_summary(
    employees: &[Employee],
    records: &[AttendanceRecord],
    week_start: NaiveDate,
) -> WeeklySummary {
    let week_end = week_start + Days::new(6);
    let employees = employees
        .iter()
        .map(|employee| {
            let mut weekly_hours = WeeklyHours::default();
            let mut days_present = 0;
            for record in records
                .iter()
                .filter(|r| r.employee_id == employee.id)
                .filter(|r| r.work_date >= week_start && r.work_date <= week_end)
            {
                weekly_hours.set_day(record.day_of_week, record.hours_worked);
                if matches!(record.status.as_str(), "present" | "partial") {
                    days_present += 1;
                }
            }
            let total_hours = weekly_hours.total();
            EmployeeWeekSummary {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                email: employee.email.clone(),
                position: employee.position.clone(),
                department: employee.department.clone(),
                weekly_hours,
                total_hours,
                days_present,
            }
        })
        .collect();
    WeeklySummary {
        week_start,
        week_end,
        employees,
    }
}
