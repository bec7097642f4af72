//! Row and payload types shared by the database layer, the resource
//! handlers, and the exporters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A shop employee. Soft-deleted via `is_active`; the API never removes the
/// row itself so historical timesheets and attendance stay resolvable.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: Option<String>, // unique when present
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job / work order with its overall hour budget.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Job {
    pub id: i64,
    pub work_order: String, // unique, customer-facing identifier
    pub job_name: String,
    pub customer: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: String, // active | completed | on_hold | cancelled
    pub total_hours: f64,
    pub completed_hours: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A budgeted sub-scope of a job.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobSection {
    pub id: i64,
    pub job_id: i64,
    pub section_name: String,
    pub estimated_hours: f64,
    pub completed_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for jobs: the job plus its section aggregates, computed by
/// the database with a LEFT JOIN + GROUP BY.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: Job,
    pub section_count: i64,
    pub total_estimated_hours: f64,
    pub total_completed_hours: f64,
}

/// A single job with its full section detail.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub sections: Vec<JobSection>,
}

/// One captured paper timesheet.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Timesheet {
    pub id: i64,
    pub employee_id: Option<i64>,
    pub employee_name: String,
    pub work_date: NaiveDate,
    pub shift_time: Option<f64>,
    pub total_hours: f64,
    pub status: String, // draft | submitted | approved | rejected
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line item of hours logged against a work order.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimesheetEntry {
    pub id: i64,
    pub timesheet_id: i64,
    pub job_id: Option<i64>,
    pub work_order: Option<String>,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub task_code: Option<String>,
    pub hours: f64, // always > 0 once stored
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row for timesheets: the sheet plus its entry aggregates.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimesheetSummary {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entry_count: i64,
    pub entries_hours: f64,
}

/// A single timesheet with its full entry detail.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimesheetDetail {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entries: Vec<TimesheetEntry>,
}

/// One day of attendance for one employee. Unique per (employee, date);
/// resubmissions overwrite in place.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendanceRecord {
    pub id: i64,
    pub employee_id: i64,
    pub work_date: NaiveDate,
    pub day_of_week: u32, // ISO weekday, Monday = 1 .. Sunday = 7
    pub hours_worked: f64,
    pub status: String, // present | absent | partial | holiday
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance listing row joined with the employee's identity columns.
/// The employee side is optional: listings use a LEFT JOIN.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttendanceWithEmployee {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

/// Hours per weekday, Monday through Sunday. Absent days stay 0.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct WeeklyHours {
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
}

impl WeeklyHours {
    /// Sets the hours for an ISO weekday (Monday = 1 .. Sunday = 7).
    /// Out-of-range values are ignored.
    pub fn set_day(&mut self, day_of_week: u32, hours: f64) {
        match day_of_week {
            1 => self.monday = hours,
            2 => self.tuesday = hours,
            3 => self.wednesday = hours,
            4 => self.thursday = hours,
            5 => self.friday = hours,
            6 => self.saturday = hours,
            7 => self.sunday = hours,
            _ => {}
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.monday
            + self.tuesday
            + self.wednesday
            + self.thursday
            + self.friday
            + self.saturday
            + self.sunday
    }
}

/// One employee's row in the weekly attendance summary.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmployeeWeekSummary {
    pub employee_id: i64,
    pub employee_name: String,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub weekly_hours: WeeklyHours,
    pub total_hours: f64,
    pub days_present: usize,
}

/// The weekly attendance summary for every active employee.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub employees: Vec<EmployeeWeekSummary>,
}

/// Metadata row for an uploaded timesheet photo. Actual file storage is
/// mocked; only the metadata and the extraction payload are persisted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadedFile {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_path: Option<String>,
    pub timesheet_id: Option<i64>,
    pub employee_name: Option<String>,
    pub work_order: Option<String>,
    pub processed: bool,
    pub processing_status: String, // pending -> completed | error
    pub processing_error: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Counters over the uploaded_files table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadStats {
    pub total: i64,
    pub processed: i64,
    pub pending: i64,
    pub error: i64,
}

/// Structured data extracted from a photographed timesheet, as supplied by
/// the client with a process request.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ExtractedTimesheet {
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub shift_time: Option<f64>,
    #[serde(default)]
    pub work_entries: Vec<ExtractedEntry>,
}

/// One work entry inside an extraction payload.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ExtractedEntry {
    #[serde(default)]
    pub work_order: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
}

/// Process and database liveness, surfaced by the health endpoint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthReport {
    pub status: String, // "ok" when the database answers, "degraded" otherwise
    pub database: bool,
    pub timestamp: DateTime<Utc>,
}
