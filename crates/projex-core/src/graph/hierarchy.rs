//! Install-number hierarchy walk.
//!
//! Every project may name a parent through its install number. Starting
//! from one entry project, [`HierarchyResolver::project_tree`] climbs that
//! chain one level per query. Each level's query returns the node itself
//! together with its children, so the tree is built bottom-up: the level
//! below is re-attached by value under the node that was just found.
//!
//! # Termination
//!
//! The walk stops when a node's install number is empty or names the node
//! itself, when the `project_is_child` filter says so, or when a parent
//! cannot be found. A parent that is referenced but missing becomes a
//! [`ProjectNode::Phantom`] root. Keys already visited in this walk also
//! stop it, so install numbers that loop (A → B → A) cannot spin forever.
//!
//! # State
//!
//! The resolver holds no state between calls. Every walk re-queries from
//! scratch, and each finished tree is passed to the
//! `project_tree_resolved` action.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::db::projects::{self, QueryError};
use crate::db::query::ProjectRef;
use crate::db::RecordFetcher;
use crate::hooks::{FilterPipeline, names};
use crate::model::{PhantomProject, ProjectNode, ProjectRecord, ProjectTree};

/// Rebuilds the tree around a project.
#[derive(Debug)]
pub struct HierarchyResolver<'a, F> {
    filters: &'a FilterPipeline,
    fetcher: &'a F,
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

impl<'a, F: RecordFetcher> HierarchyResolver<'a, F> {
    #[must_use]
    pub const fn new(filters: &'a FilterPipeline, fetcher: &'a F) -> Self {
        Self { filters, fetcher }
    }

    /// Look up `project` and build its tree.
    ///
    /// # Errors
    ///
    /// [`QueryError::NotFound`] if the project does not exist, otherwise as
    /// [`Self::project_tree`].
    pub fn project_tree_for(&self, project: &ProjectRef) -> Result<ProjectTree, QueryError> {
        let entry = projects::get_project(self.filters, self.fetcher, project)?;
        self.project_tree(&entry)
    }

    /// Build the tree anchored at the top-most reachable ancestor of
    /// `entry`, with each level's direct children attached.
    ///
    /// # Errors
    ///
    /// Hook, fetch and mapping errors propagate unchanged; nothing is
    /// retried.
    pub fn project_tree(&self, entry: &ProjectRecord) -> Result<ProjectTree, QueryError> {
        let mut key = self.filters.project_number(Some(&entry.project_number))?;
        let mut previous = ProjectTree::leaf(entry.clone());
        let mut first_level = true;
        let mut visited = HashSet::new();

        while !key.is_empty() {
            if !visited.insert(key.clone()) {
                warn!(key = %key, "install number chain loops; stopping walk");
                break;
            }

            // The level query may move `previous` into its children.
            let phantom_seed = previous
                .node
                .as_record()
                .map(|child| PhantomProject::parent_of(key.clone(), child));

            let level = self.resolve_level(&key, previous)?;
            let mut children = level.children;

            let (node, next_key) = match level.current {
                Some((record, next_key)) => (ProjectNode::Resolved(record), next_key),
                None if first_level => {
                    debug!(key = %key, "entry project has no stored row; using it as root");
                    let mut entry_tree = level
                        .previous
                        .unwrap_or_else(|| ProjectTree::leaf(entry.clone()));
                    entry_tree.children = children;
                    previous = entry_tree;
                    break;
                }
                None => {
                    let phantom = phantom_seed
                        .unwrap_or_else(|| PhantomProject::unresolved(key.clone()));
                    warn!(key = %key, "referenced parent does not exist; adding placeholder");
                    (ProjectNode::Phantom(phantom), String::new())
                }
            };

            // The level below is always re-attached, even when this level's
            // rows did not include it.
            if !first_level {
                if let Some(below) = level.previous {
                    children.push(below);
                }
            }

            debug!(
                key = %key,
                next = %next_key,
                children = children.len(),
                phantom = node.is_phantom(),
                "resolved hierarchy level"
            );

            previous = ProjectTree { node, children };
            first_level = false;
            key = next_key;
        }

        self.filters.do_actions(names::PROJECT_TREE_RESOLVED, &previous)?;
        Ok(previous)
    }

    /// Query one level and classify its rows.
    fn resolve_level(&self, key: &str, previous: ProjectTree) -> Result<Level, QueryError> {
        let previous_number = self
            .filters
            .project_number(Some(previous.node.project_number()))?;

        let mut level = Level {
            current: None,
            previous: Some(previous),
            children: Vec::new(),
        };
        let mut attached_previous = false;

        projects::get_project_and_children(self.filters, self.fetcher, key, |record| {
            let number = self.filters.project_number(Some(&record.project_number))?;

            if number == key {
                let install = self.filters.install_number(record.install_number.as_deref())?;
                let has_parent = !install.is_empty() && install != number;
                let next_key = if self.filters.is_child(has_parent, &record)? {
                    install
                } else {
                    String::new()
                };
                level.current = Some((record, next_key));
            } else if number == previous_number {
                if !attached_previous {
                    if let Some(below) = level.previous.take() {
                        level.children.push(below);
                    }
                    attached_previous = true;
                }
            } else {
                level.children.push(ProjectTree::leaf(record));
            }
            Ok(())
        })?;

        Ok(level)
    }
}

/// Rows of one level, classified.
struct Level {
    /// The node whose number equals the key, with the next key to visit.
    current: Option<(ProjectRecord, String)>,
    /// The level below, unless it was already attached from a row.
    previous: Option<ProjectTree>,
    children: Vec<ProjectTree>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
