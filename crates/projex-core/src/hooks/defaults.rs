//! Stock deployment behaviour.
//!
//! [`register_defaults`] installs the filters a fresh deployment needs to be
//! usable: number trimming, basename-suffix path matching, price display and
//! the SQLite query builder. Deployments register their own callbacks on
//! the same hooks afterwards, at a higher priority to post-process or with
//! [`HookRegistry::remove_all_filters`] first to replace.

use std::path::Path;

use num_format::{Locale, ToFormattedString};

use super::names;
use super::{DEFAULT_PRIORITY, HookError, HookRegistry};
use crate::config::Config;
use crate::db::query;
use crate::model::ProjectRecord;
use crate::paths::PathCandidate;

/// Register every default filter on `registry`.
///
/// # Errors
///
/// Returns [`HookError::TypeMismatch`] if any default hook name was already
/// registered with other types.
pub fn register_defaults(registry: &mut HookRegistry, config: &Config) -> Result<(), HookError> {
    registry.add_filter(names::PROJECT_PROJECT_NUMBER, DEFAULT_PRIORITY, |number: String, _: &()| {
        Ok(number.trim().to_string())
    })?;
    registry.add_filter(names::PROJECT_INSTALL_NUMBER, DEFAULT_PRIORITY, |number: String, _: &()| {
        Ok(number.trim().to_string())
    })?;

    registry.add_filter(
        names::PROJECT_PATH_IS_MATCH,
        DEFAULT_PRIORITY,
        |_: bool, candidate: &PathCandidate| Ok(basename_ends_with_any(candidate)),
    )?;
    registry.add_filter(
        names::INSTALL_PATH_IS_MATCH,
        DEFAULT_PRIORITY,
        |_: bool, candidate: &PathCandidate| Ok(basename_ends_with_any(candidate)),
    )?;

    registry.add_filter(
        names::PROJECT_PRICE,
        DEFAULT_PRIORITY,
        |display: String, project: &ProjectRecord| {
            Ok(project.price.map_or(display, format_price))
        },
    )?;

    query::register_query_builders(registry, config.database.max_select)
}

/// `true` when the candidate directory's name ends with one of its
/// candidate basenames.
fn basename_ends_with_any(candidate: &PathCandidate) -> bool {
    candidate
        .basenames
        .iter()
        .any(|basename| path_ends_with(&candidate.path, basename))
}

/// Format a price as a euro amount with two decimals and thousands
/// separators, e.g. `€ 12,500.00`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "€ {sign}{}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// Does `path`'s final component end with `basename`?
#[must_use]
pub fn path_ends_with(path: &Path, basename: &str) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(basename))
}
