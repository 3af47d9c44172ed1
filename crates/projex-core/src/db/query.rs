//! Query arguments and the default SQLite query builders.
//!
//! Builders are registered as filters on the `sql_*` hooks, so a
//! deployment can post-process the generated text at a higher priority or
//! drop the default with
//! [`HookRegistry::remove_all_filters`](crate::hooks::HookRegistry::remove_all_filters)
//! and supply its own dialect. The default builder replaces whatever text
//! reaches it.

use std::fmt;

use serde::Serialize;

use super::sql::{quoted_list, sanitize_sql, sql_literal};
use crate::hooks::{DEFAULT_PRIORITY, HookError, HookRegistry, names};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Asc => "",
            Self::Desc => " DESC",
        }
    }
}

/// Arguments for a project listing.
///
/// At most one selector applies, checked in this order: `project_ids`,
/// `project_numbers`, `children_of`, `search_for`, `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectQuery {
    /// Expect a single row.
    pub single: bool,
    pub project_ids: Option<Vec<String>>,
    pub project_numbers: Option<Vec<String>>,
    /// The project with this number plus every project whose install
    /// number starts with it.
    pub children_of: Option<String>,
    /// Search terms, all of which must match. A leading `!` negates a term.
    /// Searches are not capped by `max_select`.
    pub search_for: Option<Vec<String>>,
    pub status: Option<Vec<String>>,
    pub order: SortOrder,
}

impl ProjectQuery {
    #[must_use]
    pub fn children_of(number: impl Into<String>) -> Self {
        Self {
            children_of: Some(number.into()),
            order: SortOrder::Asc,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn search(terms: Vec<String>) -> Self {
        Self {
            search_for: Some(terms),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(status: Vec<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Single-row lookup for one project.
    #[must_use]
    pub fn single(project: &ProjectRef) -> Self {
        let mut query = Self {
            single: true,
            ..Self::default()
        };
        match project {
            ProjectRef::Id(id) => query.project_ids = Some(vec![id.clone()]),
            ProjectRef::Number(number) => query.project_numbers = Some(vec![number.clone()]),
        }
        query
    }
}

/// Arguments for a planning listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanningQuery {
    /// Restrict to one project; all projects when `None`.
    pub project_number: Option<String>,
    /// Children of this task; top-level tasks when `None`.
    pub parent_id: Option<String>,
    pub order: SortOrder,
}

impl PlanningQuery {
    #[must_use]
    pub fn for_project(number: impl Into<String>) -> Self {
        Self {
            project_number: Some(number.into()),
            parent_id: None,
            order: SortOrder::Asc,
        }
    }
}

/// Identifies one stored project by id or by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRef {
    Id(String),
    Number(String),
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Number(number) => f.write_str(number),
        }
    }
}

impl ProjectRef {
    fn where_clause(&self) -> String {
        match self {
            Self::Id(id) => format!("p.project_id = {}", sql_literal(id, false)),
            Self::Number(number) => format!(
                "upper(trim(p.project_number)) = '{}'",
                sanitize_sql(&number.trim().to_uppercase(), false)
            ),
        }
    }
}

/// Register the default builders for every `sql_*` hook.
///
/// # Errors
///
/// Returns [`HookError::TypeMismatch`] if a `sql_*` hook name is already
/// bound to other types.
pub fn register_query_builders(registry: &mut HookRegistry, max_select: u32) -> Result<(), HookError> {
    registry.add_filter(
        names::SQL_GET_PROJECTS,
        DEFAULT_PRIORITY,
        move |_: String, query: &ProjectQuery| Ok(select_projects(query, max_select)),
    )?;
    registry.add_filter(
        names::SQL_GET_PLANNING,
        DEFAULT_PRIORITY,
        |_: String, query: &PlanningQuery| Ok(select_planning(query)),
    )?;
    registry.add_filter(
        names::SQL_GET_ATTACHED_DOCUMENTS,
        DEFAULT_PRIORITY,
        |_: String, project: &ProjectRef| Ok(select_attached_documents(project)),
    )?;
    registry.add_filter(
        names::SQL_GET_WORK_HOURS,
        DEFAULT_PRIORITY,
        |_: String, project: &ProjectRef| Ok(select_work_hours(project)),
    )
}

const PROJECT_COLUMNS: &str = "SELECT
    p.project_id AS project_id,
    p.project_number AS project_number,
    i.install_id AS install_id,
    i.install_number AS install_number,
    i.description AS install_description,
    p.description AS project_description,
    r.relation_id AS relation_id,
    r.name AS relation_name,
    r.country_name AS relation_country_name,
    p.status_id AS status_id,
    s.name AS status_name,
    p.price AS price,
    p.date_start AS date_start,
    p.date_finish AS date_finish,
    p.notes AS notes,
    sm.name AS sales_manager_name,
    pm.name AS project_manager_name,
    pe.name AS project_engineer_name
FROM projects p
LEFT JOIN installations i ON i.install_id = p.install_id
LEFT JOIN relations r ON r.relation_id = p.relation_id
LEFT JOIN project_statuses s ON s.status_id = p.status_id
LEFT JOIN employees sm ON sm.employee_id = p.sales_manager_id
LEFT JOIN employees pm ON pm.employee_id = p.project_manager_id
LEFT JOIN employees pe ON pe.employee_id = p.project_engineer_id
WHERE 1 = 1";

/// Build the project listing SQL for `query`.
#[must_use]
pub fn select_projects(query: &ProjectQuery, max_select: u32) -> String {
    let mut sql = String::from(PROJECT_COLUMNS);

    if let Some(ids) = &query.project_ids {
        let ids: Vec<String> = ids.iter().map(|id| sql_literal(id, false)).collect();
        sql.push_str(&format!("\n    AND p.project_id IN ({})", ids.join(", ")));
    } else if let Some(numbers) = &query.project_numbers {
        let numbers: Vec<String> = numbers.iter().map(|n| n.trim().to_uppercase()).collect();
        sql.push_str(&format!(
            "\n    AND upper(trim(p.project_number)) IN ({})",
            quoted_list(numbers.iter().map(String::as_str))
        ));
    } else if let Some(key) = query.children_of.as_deref().filter(|k| !k.trim().is_empty()) {
        let key = key.trim().to_uppercase();
        sql.push_str(&format!(
            "\n    AND (\n      upper(trim(p.project_number)) = '{}'\n      OR upper(trim(i.install_number)) LIKE '{}%' ESCAPE '\\'\n    )",
            sanitize_sql(&key, false),
            sanitize_sql(&key, true),
        ));
    } else if let Some(terms) = &query.search_for {
        push_search(&mut sql, terms);
    } else if let Some(status) = &query.status {
        sql.push_str(&format!(
            "\n    AND p.status_id IN ({})",
            quoted_list(status.iter().map(|s| s.trim()))
        ));
    }

    let dir = query.order.suffix();
    sql.push_str(&format!(
        "\nORDER BY\n    date_start{dir},\n    project_number{dir},\n    install_number{dir}"
    ));

    if query.search_for.is_none() {
        let limit = if query.single { 1 } else { max_select };
        sql.push_str(&format!("\nLIMIT {limit}"));
    }
    sql
}

fn push_search(sql: &mut String, terms: &[String]) {
    let mut clauses = Vec::new();
    for term in terms {
        let (negative, term) = match term.trim().strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, term.trim()),
        };
        if term.is_empty() {
            continue;
        }
        let pattern = sanitize_sql(&term.to_lowercase(), true);
        let (like, joiner) = if negative {
            ("NOT LIKE", "AND")
        } else {
            ("LIKE", "OR")
        };
        let fields = [
            "lower(p.project_number)",
            "lower(coalesce(p.description, ''))",
            "lower(coalesce(r.name, ''))",
        ];
        let parts: Vec<String> = fields
            .iter()
            .map(|field| format!("{field} {like} '%{pattern}%' ESCAPE '\\'"))
            .collect();
        clauses.push(format!("(\n      {}\n    )", parts.join(&format!("\n      {joiner} "))));
    }
    if !clauses.is_empty() {
        sql.push_str(&format!("\n    AND {}", clauses.join("\n    AND ")));
    }
}

/// Build the planning SQL for `query`.
#[must_use]
pub fn select_planning(query: &PlanningQuery) -> String {
    let mut sql = String::from(
        "SELECT
    t.task_id AS task_id,
    t.parent_id AS parent_id,
    t.project_id AS project_id,
    p.project_number AS project_number,
    t.description AS task_description,
    t.date_start AS date_start,
    t.date_start_actual AS date_start_actual,
    t.date_finish AS date_finish,
    t.date_finish_actual AS date_finish_actual,
    t.date_delivery AS date_delivery
FROM planning_tasks t
JOIN projects p ON p.project_id = t.project_id
WHERE 1 = 1",
    );

    match query.project_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => {
            sql.push_str(&format!(
                "\n    AND upper(trim(p.project_number)) = '{}'",
                sanitize_sql(&number.to_uppercase(), false)
            ));
        }
        _ => sql.push_str("\n    AND p.project_number IS NOT NULL"),
    }

    match query.parent_id.as_deref().map(str::trim) {
        Some(parent) if !parent.is_empty() => {
            sql.push_str(&format!("\n    AND t.parent_id = {}", sql_literal(parent, false)));
        }
        _ => sql.push_str("\n    AND t.parent_id IS NULL"),
    }

    let dir = query.order.suffix();
    let columns = [
        "project_number",
        "date_start",
        "date_start_actual",
        "date_finish",
        "date_finish_actual",
        "date_delivery",
    ];
    let order: Vec<String> = columns.iter().map(|c| format!("{c}{dir}")).collect();
    sql.push_str(&format!("\nORDER BY\n    {},\n    task_id", order.join(",\n    ")));
    sql
}

/// Build the attached-documents SQL for `project`.
#[must_use]
pub fn select_attached_documents(project: &ProjectRef) -> String {
    format!(
        "SELECT
    d.project_id AS project_id,
    d.title AS title,
    d.version AS version,
    d.is_hidden AS is_hidden,
    d.path AS path,
    d.size AS size,
    d.date_created AS date_created,
    d.date_modified AS date_modified
FROM documents d
JOIN projects p ON p.project_id = d.project_id
WHERE {}
ORDER BY
    d.title,
    d.version DESC",
        project.where_clause()
    )
}

/// Build the work-hours SQL for `project`.
#[must_use]
pub fn select_work_hours(project: &ProjectRef) -> String {
    format!(
        "SELECT
    ts.project_id AS project_id,
    res.resource_id AS resource_id,
    res.first_name AS resource_first_name,
    res.name AS resource_name,
    w.worktype_id AS worktype_id,
    w.code AS worktype_code,
    w.name AS worktype_name,
    ts.date_start AS date_start,
    ts.date_end AS date_end,
    ts.amount AS amount,
    ts.rate_internal AS rate_internal,
    ts.expense AS expense
FROM timesheets ts
JOIN projects p ON p.project_id = ts.project_id
JOIN resources res ON res.resource_id = ts.resource_id
JOIN worktypes w ON w.worktype_id = ts.worktype_id
WHERE {}
ORDER BY
    ts.date_start DESC,
    res.name",
        project.where_clause()
    )
}
