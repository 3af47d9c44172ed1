//! Project database schema.
//!
//! Projects point at an installation through `install_id`; an
//! installation's `install_number` is the project number of the parent
//! project, or the project's own number when it is itself a root.

/// Migration v1: core tables plus metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS relations (
    relation_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    country_name TEXT
);

CREATE TABLE IF NOT EXISTS installations (
    install_id INTEGER PRIMARY KEY,
    install_number TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS project_statuses (
    status_id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS employees (
    employee_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id INTEGER PRIMARY KEY,
    project_number TEXT NOT NULL UNIQUE,
    install_id INTEGER REFERENCES installations(install_id) ON DELETE SET NULL,
    description TEXT,
    relation_id INTEGER REFERENCES relations(relation_id) ON DELETE SET NULL,
    status_id TEXT REFERENCES project_statuses(status_id),
    price REAL,
    date_start TEXT,
    date_finish TEXT,
    notes TEXT,
    sales_manager_id INTEGER REFERENCES employees(employee_id),
    project_manager_id INTEGER REFERENCES employees(employee_id),
    project_engineer_id INTEGER REFERENCES employees(employee_id),
    CHECK (length(trim(project_number)) > 0)
);

CREATE TABLE IF NOT EXISTS planning_tasks (
    task_id INTEGER PRIMARY KEY,
    parent_id INTEGER REFERENCES planning_tasks(task_id) ON DELETE CASCADE,
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    description TEXT,
    date_start TEXT,
    date_start_actual TEXT,
    date_finish TEXT,
    date_finish_actual TEXT,
    date_delivery TEXT
);

CREATE TABLE IF NOT EXISTS documents (
    document_id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    is_hidden INTEGER NOT NULL DEFAULT 0 CHECK (is_hidden IN (0, 1)),
    path TEXT NOT NULL,
    size INTEGER,
    date_created TEXT,
    date_modified TEXT
);

CREATE TABLE IF NOT EXISTS resources (
    resource_id INTEGER PRIMARY KEY,
    first_name TEXT,
    name TEXT NOT NULL,
    is_inactive INTEGER NOT NULL DEFAULT 0 CHECK (is_inactive IN (0, 1))
);

CREATE TABLE IF NOT EXISTS worktypes (
    worktype_id INTEGER PRIMARY KEY,
    code TEXT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS timesheets (
    timesheet_id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    resource_id INTEGER NOT NULL REFERENCES resources(resource_id),
    worktype_id INTEGER NOT NULL REFERENCES worktypes(worktype_id),
    date_start TEXT NOT NULL,
    date_end TEXT NOT NULL,
    amount REAL NOT NULL,
    rate_internal REAL NOT NULL DEFAULT 0,
    expense REAL
);

CREATE TABLE IF NOT EXISTS projex_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    seeded_at TEXT
);

INSERT OR IGNORE INTO projex_meta (id, schema_version, seeded_at)
VALUES (1, 1, NULL);
";

/// Migration v2: indexes for the hierarchy walk and drill-down queries.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_projects_number_ci
    ON projects(upper(trim(project_number)));

CREATE INDEX IF NOT EXISTS idx_projects_install
    ON projects(install_id);

CREATE INDEX IF NOT EXISTS idx_projects_date_start
    ON projects(date_start, project_number);

CREATE INDEX IF NOT EXISTS idx_installations_number_ci
    ON installations(upper(trim(install_number)));

CREATE INDEX IF NOT EXISTS idx_planning_project_parent
    ON planning_tasks(project_id, parent_id);

CREATE INDEX IF NOT EXISTS idx_documents_project
    ON documents(project_id, is_hidden);

CREATE INDEX IF NOT EXISTS idx_timesheets_project_date
    ON timesheets(project_id, date_start);
";

/// Indexes expected by the query builders.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_projects_number_ci",
    "idx_projects_install",
    "idx_projects_date_start",
    "idx_installations_number_ci",
    "idx_planning_project_parent",
    "idx_documents_project",
    "idx_timesheets_project_date",
];
