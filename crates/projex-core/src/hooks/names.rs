//! Extension-point vocabulary.
//!
//! Each constant fixes a hook's name, the value type threaded through its
//! callbacks (filters only), and the context type they receive.
//! Deployments register callbacks against these keys; the core applies
//! them at the matching points.

use super::{ActionHook, FilterHook};
use crate::db::query::{PlanningQuery, ProjectQuery, ProjectRef};
use crate::model::{ProjectNumbers, ProjectRecord, ProjectTree};
use crate::paths::PathCandidate;

/// Normalize a raw project number (default: trim).
pub const PROJECT_PROJECT_NUMBER: FilterHook<String> = FilterHook::new("project_project_number");

/// Normalize a raw install number (default: trim).
pub const PROJECT_INSTALL_NUMBER: FilterHook<String> = FilterHook::new("project_install_number");

/// Decide whether a project's install number denotes a real parent.
///
/// The incoming value is `true` when the normalized install number is
/// non-empty and differs from the normalized project number.
pub const PROJECT_IS_CHILD: FilterHook<bool, ProjectRecord> = FilterHook::new("project_is_child");

/// Candidate directory basenames for an install folder.
pub const INSTALL_PATH_BASENAMES: FilterHook<Vec<String>, ProjectNumbers> =
    FilterHook::new("install_path_basenames");

/// Candidate directory basenames for a project folder.
pub const PROJECT_PATH_BASENAMES: FilterHook<Vec<String>, ProjectNumbers> =
    FilterHook::new("project_path_basenames");

/// Accept a directory found while scanning inside an install folder as a
/// nested install folder.
pub const INSTALL_PATH_IS_MATCH: FilterHook<bool, PathCandidate> =
    FilterHook::new("install_path_is_match");

/// Accept a directory found while scanning inside an install folder as a
/// project folder.
pub const PROJECT_PATH_IS_MATCH: FilterHook<bool, PathCandidate> =
    FilterHook::new("project_path_is_match");

/// Accept a sub-directory produced by expanding a wildcard lookup path.
/// Context is the sub-directory's name.
pub const IS_VALID_PROJECT_LOCATION: FilterHook<bool, str> =
    FilterHook::new("is_valid_project_location");

/// SQL text for a project listing.
pub const SQL_GET_PROJECTS: FilterHook<String, ProjectQuery> = FilterHook::new("sql_get_projects");

/// SQL text for planning tasks.
pub const SQL_GET_PLANNING: FilterHook<String, PlanningQuery> = FilterHook::new("sql_get_planning");

/// SQL text for documents attached to a project.
pub const SQL_GET_ATTACHED_DOCUMENTS: FilterHook<String, ProjectRef> =
    FilterHook::new("sql_get_attached_documents");

/// SQL text for hours booked on a project.
pub const SQL_GET_WORK_HOURS: FilterHook<String, ProjectRef> =
    FilterHook::new("sql_get_work_hours");

/// Display string for a project's price.
pub const PROJECT_PRICE: FilterHook<String, ProjectRecord> = FilterHook::new("project_price");

/// Fired with the finished tree after every hierarchy walk.
pub const PROJECT_TREE_RESOLVED: ActionHook<ProjectTree> =
    ActionHook::new("project_tree_resolved");
