use crate::errors::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

#[instrument(skip(conn))]
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    debug!("Executing CREATE TABLE statements if tables do not exist.");
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT,
            position TEXT,
            department TEXT,
            hire_date DATE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE, -- soft delete flag
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_employees_name ON employees(name);
        CREATE INDEX IF NOT EXISTS idx_employees_active ON employees(is_active);

        CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            work_order TEXT NOT NULL UNIQUE,
            job_name TEXT NOT NULL,
            customer TEXT NOT NULL,
            location TEXT,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'completed', 'on_hold', 'cancelled')),
            total_hours REAL NOT NULL DEFAULT 0,
            completed_hours REAL NOT NULL DEFAULT 0,
            start_date DATE,
            end_date DATE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_work_order ON jobs(work_order);
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
        CREATE INDEX IF NOT EXISTS idx_jobs_customer ON jobs(customer);

        CREATE TABLE IF NOT EXISTS job_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_id INTEGER NOT NULL REFERENCES jobs (id) ON DELETE CASCADE,
            section_name TEXT NOT NULL,
            estimated_hours REAL NOT NULL DEFAULT 0,
            completed_hours REAL NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_job_sections_job_id ON job_sections(job_id);

        CREATE TABLE IF NOT EXISTS timesheets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER REFERENCES employees (id) ON DELETE SET NULL,
            employee_name TEXT NOT NULL,
            work_date DATE NOT NULL,
            shift_time REAL,
            total_hours REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'draft'
                CHECK (status IN ('draft', 'submitted', 'approved', 'rejected')),
            notes TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_timesheets_employee_id ON timesheets(employee_id);
        CREATE INDEX IF NOT EXISTS idx_timesheets_work_date ON timesheets(work_date);
        CREATE INDEX IF NOT EXISTS idx_timesheets_status ON timesheets(status);

        CREATE TABLE IF NOT EXISTS timesheet_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timesheet_id INTEGER NOT NULL REFERENCES timesheets (id) ON DELETE CASCADE,
            job_id INTEGER REFERENCES jobs (id) ON DELETE SET NULL,
            work_order TEXT,
            customer TEXT,
            description TEXT,
            task_code TEXT,
            hours REAL NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_timesheet_entries_timesheet_id
            ON timesheet_entries(timesheet_id);
        CREATE INDEX IF NOT EXISTS idx_timesheet_entries_job_id ON timesheet_entries(job_id);

        CREATE TABLE IF NOT EXISTS attendance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees (id) ON DELETE CASCADE,
            work_date DATE NOT NULL,
            day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 1 AND 7),
            hours_worked REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'present'
                CHECK (status IN ('present', 'absent', 'partial', 'holiday')),
            notes TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (employee_id, work_date) -- upsert target
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_employee_date
            ON attendance(employee_id, work_date);
        CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(work_date);

        CREATE TABLE IF NOT EXISTS uploaded_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            original_name TEXT NOT NULL,
            file_type TEXT,
            file_size INTEGER,
            file_path TEXT,
            timesheet_id INTEGER REFERENCES timesheets (id) ON DELETE SET NULL,
            employee_name TEXT,
            work_order TEXT,
            processed BOOLEAN NOT NULL DEFAULT FALSE,
            processing_status TEXT NOT NULL DEFAULT 'pending',
            processing_error TEXT,
            extracted_data TEXT, -- JSON document
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_uploaded_files_timesheet_id
            ON uploaded_files(timesheet_id);
        CREATE INDEX IF NOT EXISTS idx_uploaded_files_processed ON uploaded_files(processed);
        CREATE INDEX IF NOT EXISTS idx_uploaded_files_created_at ON uploaded_files(created_at);

        COMMIT;",
    )
    .map_err(|e| Error::Database(format!("Failed to create tables: {}", e)))?;
    info!("Database tables ensured.");
    Ok(())
}
