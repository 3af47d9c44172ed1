//! Project records and the tree shape the hierarchy resolver builds.

use chrono::NaiveDate;
use serde::Serialize;

use super::row::{FromRow, MappingError, Row, RowReader};

/// One project row as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub project_id: String,
    pub project_number: String,
    pub install_id: Option<String>,
    pub install_number: Option<String>,
    pub install_description: Option<String>,
    pub project_description: Option<String>,
    pub relation_id: Option<String>,
    pub relation_name: Option<String>,
    pub relation_country_name: Option<String>,
    pub status_id: Option<String>,
    pub status_name: Option<String>,
    pub price: Option<f64>,
    pub date_start: Option<NaiveDate>,
    pub date_finish: Option<NaiveDate>,
    pub notes: Option<String>,
    pub sales_manager_name: Option<String>,
    pub project_manager_name: Option<String>,
    pub project_engineer_name: Option<String>,
}

impl ProjectRecord {
    /// A record with only its identity set.
    #[must_use]
    pub fn new(project_id: impl Into<String>, project_number: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            project_number: project_number.into(),
            install_id: None,
            install_number: None,
            install_description: None,
            project_description: None,
            relation_id: None,
            relation_name: None,
            relation_country_name: None,
            status_id: None,
            status_name: None,
            price: None,
            date_start: None,
            date_finish: None,
            notes: None,
            sales_manager_name: None,
            project_manager_name: None,
            project_engineer_name: None,
        }
    }

    /// The lookup key pair used by path resolution.
    #[must_use]
    pub fn numbers(&self) -> ProjectNumbers {
        ProjectNumbers {
            project_number: self.project_number.clone(),
            install_number: self.install_number.clone(),
        }
    }
}

impl FromRow for ProjectRecord {
    fn from_row(row: &Row) -> Result<Self, MappingError> {
        let r = RowReader::new(row);
        Ok(Self {
            project_id: r.id("project_id")?,
            project_number: r.text("project_number")?,
            install_id: r.opt_id("install_id")?,
            install_number: r.opt_text("install_number")?,
            install_description: r.opt_text("install_description")?,
            project_description: r.opt_text("project_description")?,
            relation_id: r.opt_id("relation_id")?,
            relation_name: r.opt_text("relation_name")?,
            relation_country_name: r.opt_text("relation_country_name")?,
            status_id: r.opt_id("status_id")?,
            status_name: r.opt_text("status_name")?,
            price: r.opt_f64("price")?,
            date_start: r.opt_date("date_start")?,
            date_finish: r.opt_date("date_finish")?,
            notes: r.opt_text("notes")?,
            sales_manager_name: r.opt_text("sales_manager_name")?,
            project_manager_name: r.opt_text("project_manager_name")?,
            project_engineer_name: r.opt_text("project_engineer_name")?,
        })
    }
}

/// Placeholder for a parent that is referenced by an install number but
/// absent from storage. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhantomProject {
    pub project_number: String,
    pub project_description: Option<String>,
    pub relation_id: Option<String>,
    pub relation_name: Option<String>,
    pub status_id: &'static str,
    pub status_name: &'static str,
}

impl PhantomProject {
    pub const STATUS_ID: &'static str = "!EXISTS";
    pub const STATUS_NAME: &'static str = "This project doesn't exist";

    /// Phantom parent `project_number` of `child`, described with the
    /// child's install-side fields.
    #[must_use]
    pub fn parent_of(project_number: impl Into<String>, child: &ProjectRecord) -> Self {
        Self {
            project_number: project_number.into(),
            project_description: child.install_description.clone(),
            relation_id: child.relation_id.clone(),
            relation_name: child.relation_name.clone(),
            status_id: Self::STATUS_ID,
            status_name: Self::STATUS_NAME,
        }
    }

    /// Phantom with nothing known beyond its number.
    #[must_use]
    pub fn unresolved(project_number: impl Into<String>) -> Self {
        Self {
            project_number: project_number.into(),
            project_description: None,
            relation_id: None,
            relation_name: None,
            status_id: Self::STATUS_ID,
            status_name: Self::STATUS_NAME,
        }
    }
}

/// A tree node: either a stored project or a phantom parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectNode {
    Resolved(ProjectRecord),
    Phantom(PhantomProject),
}

impl ProjectNode {
    #[must_use]
    pub fn project_number(&self) -> &str {
        match self {
            Self::Resolved(record) => &record.project_number,
            Self::Phantom(phantom) => &phantom.project_number,
        }
    }

    /// Storage id; `None` for phantoms.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::Resolved(record) => Some(&record.project_id),
            Self::Phantom(_) => None,
        }
    }

    #[must_use]
    pub const fn is_phantom(&self) -> bool {
        matches!(self, Self::Phantom(_))
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&ProjectRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Phantom(_) => None,
        }
    }

    /// Description shown for the node.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Resolved(record) => record.project_description.as_deref(),
            Self::Phantom(phantom) => phantom.project_description.as_deref(),
        }
    }

    /// Status label shown for the node.
    #[must_use]
    pub fn status_name(&self) -> Option<&str> {
        match self {
            Self::Resolved(record) => record.status_name.as_deref(),
            Self::Phantom(phantom) => Some(phantom.status_name),
        }
    }
}

/// A node with its direct children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTree {
    pub node: ProjectNode,
    pub children: Vec<ProjectTree>,
}

impl ProjectTree {
    /// A resolved node without children.
    #[must_use]
    pub const fn leaf(record: ProjectRecord) -> Self {
        Self {
            node: ProjectNode::Resolved(record),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in the tree, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always `false`; a tree holds at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Depth-first search for the node with `project_number`.
    #[must_use]
    pub fn find(&self, project_number: &str) -> Option<&Self> {
        if self.node.project_number() == project_number {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find(project_number))
    }
}

/// Project/install number pair used for path lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectNumbers {
    pub project_number: String,
    pub install_number: Option<String>,
}

impl ProjectNumbers {
    #[must_use]
    pub fn new(project_number: impl Into<String>, install_number: Option<String>) -> Self {
        Self {
            project_number: project_number.into(),
            install_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    fn project_row() -> Row {
        let mut row = Row::new();
        row.insert("project_id".into(), Value::Integer(7));
        row.insert("project_number".into(), Value::Text("P-0042".into()));
        row.insert("install_number".into(), Value::Text("I-0042".into()));
        row.insert("price".into(), Value::Integer(1500));
        row.insert("date_start".into(), Value::Text("2024-02-01".into()));
        row.insert("notes".into(), Value::Null);
        row
    }

    #[test]
    fn maps_a_project_row() {
        let project = ProjectRecord::from_row(&project_row()).unwrap();
        assert_eq!(project.project_id, "7");
        assert_eq!(project.project_number, "P-0042");
        assert_eq!(project.install_number.as_deref(), Some("I-0042"));
        assert_eq!(project.price, Some(1500.0));
        assert_eq!(project.date_start, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(project.notes, None);
        assert_eq!(project.relation_name, None);
    }

    #[test]
    fn project_number_is_required() {
        let mut row = project_row();
        row.remove("project_number");
        assert!(matches!(
            ProjectRecord::from_row(&row),
            Err(MappingError::MissingColumn { column }) if column == "project_number"
        ));
    }

    #[test]
    fn phantom_inherits_install_side_fields() {
        let mut child = ProjectRecord::new("1", "P-1");
        child.install_description = Some("Main hall".into());
        child.relation_name = Some("ACME".into());
        child.project_description = Some("Not inherited".into());

        let phantom = PhantomProject::parent_of("I-9", &child);
        assert_eq!(phantom.project_number, "I-9");
        assert_eq!(phantom.project_description.as_deref(), Some("Main hall"));
        assert_eq!(phantom.relation_name.as_deref(), Some("ACME"));
        assert_eq!(phantom.status_id, "!EXISTS");

        let node = ProjectNode::Phantom(phantom);
        assert!(node.is_phantom());
        assert_eq!(node.project_id(), None);
        assert_eq!(node.status_name(), Some(PhantomProject::STATUS_NAME));
    }

    #[test]
    fn nodes_serialize_with_a_kind_tag() {
        let tree = ProjectTree::leaf(ProjectRecord::new("1", "P-1"));
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["node"]["kind"], "resolved");
        assert_eq!(json["node"]["project_number"], "P-1");
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn find_searches_depth_first() {
        let mut root = ProjectTree::leaf(ProjectRecord::new("1", "I-1"));
        let mut mid = ProjectTree::leaf(ProjectRecord::new("2", "P-2"));
        mid.children.push(ProjectTree::leaf(ProjectRecord::new("3", "P-3")));
        root.children.push(mid);

        assert_eq!(root.len(), 3);
        assert_eq!(root.find("P-3").and_then(|t| t.node.project_id()), Some("3"));
        assert!(root.find("P-9").is_none());
    }
}
