//! Sample dataset for trying the browser without a production database.
//!
//! The data covers every hierarchy shape the resolver handles:
//!
//! | Project     | Install   | Shape                                   |
//! |-------------|-----------|-----------------------------------------|
//! | `I-0042`    | `I-0042`  | installation root                       |
//! | `P-0042`    | `I-0042`  | child of the root, parent of `P-0042-01`|
//! | `P-0043`    | `I-0042`  | sibling of `P-0042`                     |
//! | `P-0042-01` | `P-0042`  | grandchild                              |
//! | `P-0101`    | `I-0100`  | parent `I-0100` does not exist          |
//! | `P-0007`    | `P-0007`  | self-installed, no children             |
//! | `P-0008`    | (none)    | no install number                       |

use rusqlite::{Connection, params};

struct SeedProject {
    id: i64,
    number: &'static str,
    install_id: Option<i64>,
    description: &'static str,
    relation_id: i64,
    status_id: &'static str,
    price: Option<f64>,
    date_start: &'static str,
}

#[allow(clippy::too_many_arguments)]
const fn project(
    id: i64,
    number: &'static str,
    install_id: Option<i64>,
    description: &'static str,
    relation_id: i64,
    status_id: &'static str,
    price: Option<f64>,
    date_start: &'static str,
) -> SeedProject {
    SeedProject {
        id,
        number,
        install_id,
        description,
        relation_id,
        status_id,
        price,
        date_start,
    }
}

const PROJECTS: &[SeedProject] = &[
    project(1, "I-0042", Some(1), "Bottling line 4", 1, "90", Some(480_000.0), "2021-03-01"),
    project(2, "P-0042", Some(1), "Filler upgrade", 1, "20", Some(125_500.0), "2024-01-15"),
    project(3, "P-0043", Some(1), "Conveyor guarding", 1, "10", None, "2024-04-02"),
    project(4, "P-0042-01", Some(2), "Filler valve retrofit", 1, "20", Some(18_250.0), "2024-02-01"),
    project(5, "P-0101", Some(3), "Evaporator replacement", 2, "20", Some(76_000.0), "2023-11-20"),
    project(6, "P-0007", Some(4), "Showroom refit", 3, "90", Some(9_800.0), "2022-06-10"),
    project(7, "P-0008", None, "Site survey", 3, "10", None, "2024-05-06"),
];

/// Insert the sample dataset. Rows that already exist are left alone.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is written in that case.
pub fn seed(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "INSERT OR IGNORE INTO relations (relation_id, name, country_name) VALUES
            (1, 'Brouwerij De Valk', 'Netherlands'),
            (2, 'Nordic Dairy AB', 'Sweden'),
            (3, 'Atelier Roux', 'France');

         INSERT OR IGNORE INTO project_statuses (status_id, name) VALUES
            ('10', 'Quotation'),
            ('20', 'In progress'),
            ('90', 'Completed');

         INSERT OR IGNORE INTO employees (employee_id, name) VALUES
            (1, 'M. de Vries'),
            (2, 'S. Lindqvist'),
            (3, 'J. Bakker');

         INSERT OR IGNORE INTO installations (install_id, install_number, description) VALUES
            (1, 'I-0042', 'Bottling line 4'),
            (2, 'P-0042', 'Filler upgrade'),
            (3, 'I-0100', 'Cold storage hall'),
            (4, 'P-0007', 'Showroom refit');",
    )?;

    for project in PROJECTS {
        tx.execute(
            "INSERT OR IGNORE INTO projects (
                project_id, project_number, install_id, description, relation_id,
                status_id, price, date_start, sales_manager_id, project_manager_id,
                project_engineer_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, 2, 3)",
            params![
                project.id,
                project.number,
                project.install_id,
                project.description,
                project.relation_id,
                project.status_id,
                project.price,
                project.date_start,
            ],
        )?;
    }

    tx.execute_batch(
        "INSERT OR IGNORE INTO planning_tasks (
            task_id, parent_id, project_id, description, date_start, date_finish, date_delivery
         ) VALUES
            (1, NULL, 2, 'Engineering', '2024-01-15', '2024-02-28', NULL),
            (2, 1, 2, 'Valve layout drawings', '2024-01-15', '2024-02-05', NULL),
            (3, NULL, 2, 'Installation on site', '2024-03-04', '2024-03-22', '2024-03-29'),
            (4, NULL, 5, 'Dismantle old evaporator', '2023-12-04', '2023-12-08', NULL);

         INSERT OR IGNORE INTO documents (
            document_id, project_id, title, version, is_hidden, path, size, date_created
         ) VALUES
            (1, 2, 'Quotation', 2, 0, 'P-0042/quotation-v2.pdf', 182344, '2024-01-10 09:12:00'),
            (2, 2, 'Quotation', 1, 1, 'P-0042/quotation-v1.pdf', 176002, '2023-12-18 14:40:00'),
            (3, 2, 'P&ID', 1, 0, 'P-0042/pid.pdf', 904211, '2024-01-22 11:05:00');

         INSERT OR IGNORE INTO resources (resource_id, first_name, name) VALUES
            (1, 'Anna', 'Jansen'),
            (2, NULL, 'Subcontractor Hoek');

         INSERT OR IGNORE INTO worktypes (worktype_id, code, name) VALUES
            (1, 'ENG', 'Engineering'),
            (2, 'MNT', 'Mounting');

         INSERT OR IGNORE INTO timesheets (
            timesheet_id, project_id, resource_id, worktype_id, date_start, date_end,
            amount, rate_internal, expense
         ) VALUES
            (1, 2, 1, 1, '2024-01-16 08:00:00', '2024-01-16 16:30:00', 8.0, 65.0, NULL),
            (2, 2, 1, 1, '2024-01-17 08:00:00', '2024-01-17 12:00:00', 4.0, 65.0, NULL),
            (3, 2, 2, 2, '2024-03-05 07:00:00', '2024-03-05 17:00:00', 9.5, 48.5, 35.0);",
    )?;

    tx.execute(
        "UPDATE projex_meta SET seeded_at = ?1 WHERE id = 1",
        [chrono::Utc::now().to_rfc3339()],
    )?;

    tx.commit()?;
    tracing::info!(projects = PROJECTS.len(), "seeded demo dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::seed;
    use crate::db::migrations;
    use rusqlite::Connection;

    #[test]
    fn seeding_twice_is_stable() -> rusqlite::Result<()> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;
        seed(&mut conn)?;
        seed(&mut conn)?;

        let projects: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |r| r.get(0))?;
        assert_eq!(projects, 7);
        let seeded: Option<String> =
            conn.query_row("SELECT seeded_at FROM projex_meta WHERE id = 1", [], |r| r.get(0))?;
        assert!(seeded.is_some());
        Ok(())
    }
}
