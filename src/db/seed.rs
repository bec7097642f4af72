use crate::db::connection::acquire;
use crate::db::DbPool;
use crate::errors::{Error, Result};
use rusqlite::{params, OptionalExtension, Transaction};
use tracing::{debug, info, instrument};

const DEMO_EMPLOYEES: &[(&str, &str, &str, &str)] = &[
    ("John Smith", "john.smith@company.com", "Senior Technician", "Manufacturing"),
    ("Jane Doe", "jane.doe@company.com", "Welder", "Manufacturing"),
    ("Mike Johnson", "mike.johnson@company.com", "Machinist", "Manufacturing"),
];

const DEMO_JOBS: &[(&str, &str, &str, f64)] = &[
    ("4363", "Production Line Repair", "ABC Manufacturing", 40.0),
    ("4364", "Custom Fabrication", "XYZ Corp", 60.0),
    ("4365", "Equipment Installation", "DEF Industries", 25.0),
];

// Sections attach to the first demo job only.
const DEMO_SECTIONS: &[(&str, f64, f64)] = &[
    ("Preparation", 8.0, 8.0),
    ("Welding", 24.0, 7.0),
    ("Finishing", 8.0, 0.0),
];

/// Seeds demo employees, jobs, and sections. Safe to run repeatedly: rows
/// already present (matched by email / work order) are left alone.
#[instrument(skip(pool))]
pub async fn seed_demo_data(pool: &DbPool) -> Result<()> {
    let mut conn = acquire(pool)?;
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("Failed to start transaction: {}", e)))?;

    for (name, email, position, department) in DEMO_EMPLOYEES {
        let inserted = tx.execute(
            "INSERT INTO employees (name, email, position, department, is_active)
             SELECT ?1, ?2, ?3, ?4, TRUE
             WHERE NOT EXISTS (SELECT 1 FROM employees WHERE email = ?2)",
            params![name, email, position, department],
        )?;
        if inserted == 0 {
            debug!("Demo employee '{}' already present, skipping", name);
        }
    }

    for (work_order, job_name, customer, total_hours) in DEMO_JOBS {
        let inserted = tx.execute(
            "INSERT INTO jobs (work_order, job_name, customer, total_hours)
             SELECT ?1, ?2, ?3, ?4
             WHERE NOT EXISTS (SELECT 1 FROM jobs WHERE work_order = ?1)",
            params![work_order, job_name, customer, total_hours],
        )?;
        if inserted == 0 {
            debug!("Demo job '{}' already present, skipping", work_order);
        }
    }

    seed_sections(&tx, DEMO_JOBS[0].0)?;

    tx.commit()
        .map_err(|e| Error::Database(format!("Failed to commit demo seed: {}", e)))?;
    info!("Demo data ensured.");
    Ok(())
}

fn seed_sections(tx: &Transaction<'_>, work_order: &str) -> Result<()> {
    let job_id: Option<i64> = tx
        .query_row(
            "SELECT id FROM jobs WHERE work_order = ?1",
            params![work_order],
            |row| row.get(0),
        )
        .optional()?;
    let Some(job_id) = job_id else {
        return Ok(());
    };
    for (section_name, estimated, completed) in DEMO_SECTIONS {
        tx.execute(
            "INSERT INTO job_sections (job_id, section_name, estimated_hours, completed_hours)
             SELECT ?1, ?2, ?3, ?4
             WHERE NOT EXISTS (
                 SELECT 1 FROM job_sections WHERE job_id = ?1 AND section_name = ?2
             )",
            params![job_id, section_name, estimated, completed],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{count_rows, init_test_tracing, setup_test_db};

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        seed_demo_data(&pool).await?;
        seed_demo_data(&pool).await?;

        let conn = pool.lock().unwrap();
        assert_eq!(count_rows(&conn, "employees")?, 3);
        assert_eq!(count_rows(&conn, "jobs")?, 3);
        assert_eq!(count_rows(&conn, "job_sections")?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_attaches_sections_to_first_job() -> Result<()> {
        let pool = setup_test_db().await?;
        seed_demo_data(&pool).await?;

        let conn = pool.lock().unwrap();
        let (estimated, completed): (f64, f64) = conn.query_row(
            "SELECT COALESCE(SUM(js.estimated_hours), 0), COALESCE(SUM(js.completed_hours), 0)
             FROM job_sections js JOIN jobs j ON js.job_id = j.id
             WHERE j.work_order = '4363'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert!((estimated - 40.0).abs() < f64::EPSILON);
        assert!((completed - 15.0).abs() < f64::EPSILON);
        Ok(())
    }
}
