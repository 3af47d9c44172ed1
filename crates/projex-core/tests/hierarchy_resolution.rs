//! Tree walks against a scripted fetcher and against the demo database.

use std::cell::Cell;
use std::collections::HashMap;

use projex_core::config::Config;
use projex_core::db::query::{ProjectQuery, ProjectRef};
use projex_core::db::{self, FetchError, RecordFetcher, SqliteFetcher};
use projex_core::demo;
use projex_core::graph::HierarchyResolver;
use projex_core::hooks::{DEFAULT_PRIORITY, FilterPipeline, HookRegistry, defaults, names};
use projex_core::model::{PhantomProject, ProjectNode, ProjectRecord, ProjectTree, Row};
use rusqlite::types::Value;

// ---------------------------------------------------------------------------
// Scripted fetcher
// ---------------------------------------------------------------------------

/// Answers `children_of:<KEY>` queries from a fixed table.
#[derive(Default)]
struct ScriptedFetcher {
    levels: HashMap<String, Vec<Row>>,
    calls: Cell<usize>,
}

impl ScriptedFetcher {
    fn with(mut self, key: &str, rows: Vec<Row>) -> Self {
        self.levels.insert(key.to_string(), rows);
        self
    }
}

impl RecordFetcher for ScriptedFetcher {
    fn execute<E, F>(&self, query: &str, mut on_row: F) -> Result<usize, E>
    where
        E: From<FetchError>,
        F: FnMut(Row) -> Result<(), E>,
    {
        self.calls.set(self.calls.get() + 1);
        let key = query.strip_prefix("children_of:").unwrap_or(query);
        let rows = self.levels.get(key).cloned().unwrap_or_default();
        for row in &rows {
            on_row(row.clone())?;
        }
        Ok(rows.len())
    }
}

fn project_row(id: i64, number: &str, install: &str) -> Row {
    let mut row = Row::new();
    row.insert("project_id".into(), Value::Integer(id));
    row.insert("project_number".into(), Value::Text(number.into()));
    row.insert("install_number".into(), Value::Text(install.into()));
    row.insert("install_description".into(), Value::Text(format!("{install} hall")));
    row.insert("relation_name".into(), Value::Text("ACME".into()));
    row
}

fn entry(id: &str, number: &str, install: &str) -> ProjectRecord {
    let mut record = ProjectRecord::new(id, number);
    record.install_number = Some(install.into());
    record.install_description = Some(format!("{install} hall"));
    record.relation_name = Some("ACME".into());
    record
}

fn scripted_pipeline() -> FilterPipeline {
    let mut registry = HookRegistry::new();
    defaults::register_defaults(&mut registry, &Config::default()).expect("defaults");
    assert!(registry.remove_all_filters(names::SQL_GET_PROJECTS.name()));
    registry
        .add_filter(
            names::SQL_GET_PROJECTS,
            DEFAULT_PRIORITY,
            |_: String, query: &ProjectQuery| {
                Ok(format!(
                    "children_of:{}",
                    query.children_of.as_deref().unwrap_or_default()
                ))
            },
        )
        .expect("stub query");
    FilterPipeline::new(registry)
}

fn child_numbers(tree: &ProjectTree) -> Vec<&str> {
    tree.children
        .iter()
        .map(|child| child.node.project_number())
        .collect()
}

#[test]
fn scenario_entry_climbs_to_its_installation() {
    let fetcher = ScriptedFetcher::default()
        .with("P-0042", vec![project_row(1, "P-0042", "I-0042")])
        .with(
            "I-0042",
            vec![
                project_row(7, "I-0042", "I-0042"),
                project_row(1, "P-0042", "I-0042"),
            ],
        );
    let filters = scripted_pipeline();

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree(&entry("1", "P-0042", "I-0042"))
        .expect("tree");

    assert_eq!(tree.node.project_number(), "I-0042");
    assert_eq!(tree.node.project_id(), Some("7"));
    assert_eq!(child_numbers(&tree), vec!["P-0042"]);
    assert!(tree.children[0].children.is_empty());
}

#[test]
fn zero_rows_for_the_parent_yield_a_phantom_root() {
    let fetcher =
        ScriptedFetcher::default().with("P-0101", vec![project_row(5, "P-0101", "I-0100")]);
    let filters = scripted_pipeline();

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree(&entry("5", "P-0101", "I-0100"))
        .expect("tree");

    let ProjectNode::Phantom(phantom) = &tree.node else {
        panic!("expected a phantom root, got {:?}", tree.node);
    };
    assert_eq!(phantom.project_number, "I-0100");
    assert_eq!(phantom.status_id, PhantomProject::STATUS_ID);
    assert_eq!(phantom.status_name, "This project doesn't exist");
    assert_eq!(phantom.project_description.as_deref(), Some("I-0100 hall"));
    assert_eq!(phantom.relation_name.as_deref(), Some("ACME"));
    assert_eq!(tree.node.project_id(), None);
    assert_eq!(child_numbers(&tree), vec!["P-0101"]);
}

#[test]
fn parent_query_returning_only_the_child_still_yields_a_described_phantom() {
    let fetcher = ScriptedFetcher::default()
        .with("P-0101", vec![project_row(5, "P-0101", "I-0100")])
        .with("I-0100", vec![project_row(5, "P-0101", "I-0100")]);
    let filters = scripted_pipeline();

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree(&entry("5", "P-0101", "I-0100"))
        .expect("tree");

    let ProjectNode::Phantom(phantom) = &tree.node else {
        panic!("expected a phantom root, got {:?}", tree.node);
    };
    assert_eq!(phantom.project_number, "I-0100");
    assert_eq!(phantom.project_description.as_deref(), Some("I-0100 hall"));
    assert_eq!(phantom.relation_name.as_deref(), Some("ACME"));
    assert_eq!(child_numbers(&tree), vec!["P-0101"]);
    assert_eq!(tree.children[0].node.project_id(), Some("5"));
    assert_eq!(fetcher.calls.get(), 2);
}

#[test]
fn self_installed_entry_is_returned_as_root() {
    let fetcher =
        ScriptedFetcher::default().with("P-0007", vec![project_row(6, " P-0007 ", "P-0007 ")]);
    let filters = scripted_pipeline();

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree(&entry("6", "P-0007", "P-0007"))
        .expect("tree");

    assert!(!tree.node.is_phantom());
    assert_eq!(tree.node.project_id(), Some("6"));
    assert!(tree.children.is_empty());
    assert_eq!(fetcher.calls.get(), 1);
}

#[test]
fn rows_split_into_node_previous_and_siblings() {
    let fetcher = ScriptedFetcher::default()
        .with("P-2", vec![project_row(2, "P-2", "I-1")])
        .with(
            "I-1",
            vec![
                project_row(1, "I-1", "I-1"),
                project_row(2, "P-2", "I-1"),
                project_row(3, "P-3", "I-1"),
            ],
        );
    let filters = scripted_pipeline();

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree(&entry("2", "P-2", "I-1"))
        .expect("tree");

    assert_eq!(tree.node.project_number(), "I-1");
    assert_eq!(tree.children.len(), 2);
    assert_eq!(child_numbers(&tree), vec!["P-2", "P-3"]);
}

#[test]
fn walking_twice_gives_equal_trees() {
    let fetcher = ScriptedFetcher::default()
        .with("P-2", vec![project_row(2, "P-2", "I-1")])
        .with(
            "I-1",
            vec![project_row(1, "I-1", ""), project_row(2, "P-2", "I-1")],
        );
    let filters = scripted_pipeline();
    let resolver = HierarchyResolver::new(&filters, &fetcher);
    let start = entry("2", "P-2", "I-1");

    let first = resolver.project_tree(&start).expect("first walk");
    let second = resolver.project_tree(&start).expect("second walk");
    assert_eq!(first, second);
    assert_eq!(fetcher.calls.get(), 4);
}

// ---------------------------------------------------------------------------
// Demo database
// ---------------------------------------------------------------------------

fn demo_db() -> (tempfile::TempDir, rusqlite::Connection, FilterPipeline) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut conn = db::open_database(&dir.path().join("projex.sqlite3")).expect("open");
    demo::seed(&mut conn).expect("seed");
    let mut registry = HookRegistry::new();
    defaults::register_defaults(&mut registry, &Config::default()).expect("defaults");
    (dir, conn, FilterPipeline::new(registry))
}

#[test]
fn demo_grandchild_resolves_full_chain() {
    let (_dir, conn, filters) = demo_db();
    let fetcher = SqliteFetcher::new(&conn);

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree_for(&ProjectRef::Number("P-0042-01".into()))
        .expect("tree");

    assert_eq!(tree.node.project_number(), "I-0042");
    let mut top = child_numbers(&tree);
    top.sort_unstable();
    assert_eq!(top, vec!["P-0042", "P-0043"]);

    let middle = tree.find("P-0042").expect("P-0042 in tree");
    assert_eq!(child_numbers(middle), vec!["P-0042-01"]);
    assert_eq!(tree.len(), 4);
}

#[test]
fn demo_missing_installation_is_phantom() {
    let (_dir, conn, filters) = demo_db();
    let fetcher = SqliteFetcher::new(&conn);

    let tree = HierarchyResolver::new(&filters, &fetcher)
        .project_tree_for(&ProjectRef::Number("P-0101".into()))
        .expect("tree");

    assert!(tree.node.is_phantom());
    assert_eq!(tree.node.project_number(), "I-0100");
    assert_eq!(tree.node.description(), Some("Cold storage hall"));
    assert_eq!(child_numbers(&tree), vec!["P-0101"]);
}

#[test]
fn demo_projects_without_parent_are_roots() {
    let (_dir, conn, filters) = demo_db();
    let fetcher = SqliteFetcher::new(&conn);
    let resolver = HierarchyResolver::new(&filters, &fetcher);

    for number in ["P-0007", "P-0008"] {
        let tree = resolver
            .project_tree_for(&ProjectRef::Number(number.into()))
            .expect("tree");
        assert_eq!(tree.node.project_number(), number);
        assert!(tree.children.is_empty());
    }
}
