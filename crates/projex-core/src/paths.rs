//! Project folder discovery.
//!
//! Project folders live under one or more configured lookup roots. A root
//! may contain a single `*` component (e.g. `/srv/projects/*`), expanded to
//! every sub-directory accepted by the `is_valid_project_location` filter.
//!
//! Inside each location the resolver first checks for folders named
//! exactly after a candidate basename. A matching install folder is then
//! scanned one level deep, and each directory inside it is offered to the
//! `project_path_is_match` and `install_path_is_match` filters.
//!
//! Directory listings are visited in descending natural order, so the most
//! recent numbered folders come first.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use lexical_sort::natural_lexical_cmp;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::FilesystemConfig;
use crate::hooks::{FilterPipeline, HookError, names};
use crate::model::ProjectNumbers;

/// A directory offered to a `*_path_is_match` filter together with the
/// basenames it may match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCandidate {
    pub path: PathBuf,
    pub basenames: Vec<String>,
}

/// Folders found for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
    pub install_paths: Vec<PathBuf>,
    pub project_paths: Vec<PathBuf>,
}

impl ProjectPaths {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.install_paths.is_empty() && self.project_paths.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PathError + '_ {
    move |source| PathError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolves project folders through the path filters.
#[derive(Debug)]
pub struct PathResolver<'a> {
    filters: &'a FilterPipeline,
    lookup_paths: &'a [PathBuf],
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub const fn new(filters: &'a FilterPipeline, lookup_paths: &'a [PathBuf]) -> Self {
        Self {
            filters,
            lookup_paths,
        }
    }

    /// Expand the lookup roots into concrete locations, sorted descending.
    ///
    /// Roots whose wildcard parent does not exist are skipped.
    ///
    /// # Errors
    ///
    /// Filter errors, or a wildcard parent that exists but cannot be listed.
    pub fn project_locations(&self) -> Result<Vec<PathBuf>, PathError> {
        let mut locations = Vec::new();

        for lookup in self.lookup_paths {
            let Some((base, rest)) = split_wildcard(lookup) else {
                locations.push(lookup.clone());
                continue;
            };

            if !base.is_dir() {
                debug!(path = %base.display(), "lookup root missing; skipped");
                continue;
            }

            for name in sorted_dir_names(&base)? {
                let candidate = base.join(&name);
                if !candidate.is_dir() {
                    continue;
                }
                if !self
                    .filters
                    .apply_filters(names::IS_VALID_PROJECT_LOCATION, true, name.as_str())?
                {
                    trace!(path = %candidate.display(), "location rejected by filter");
                    continue;
                }
                locations.push(if rest.as_os_str().is_empty() {
                    candidate
                } else {
                    candidate.join(&rest)
                });
            }
        }

        locations.sort_by(|a, b| {
            natural_lexical_cmp(&b.to_string_lossy(), &a.to_string_lossy())
        });
        Ok(locations)
    }

    /// Find the folders of `numbers` under every configured location.
    ///
    /// # Errors
    ///
    /// As [`Self::project_locations`] and [`Self::project_paths_in`].
    pub fn project_paths(&self, numbers: &ProjectNumbers) -> Result<ProjectPaths, PathError> {
        let locations = self.project_locations()?;
        self.project_paths_in(numbers, &locations)
    }

    /// Find the folders of `numbers` under the given `locations`.
    ///
    /// An empty install number falls back to the project number.
    ///
    /// # Errors
    ///
    /// Filter errors, or an install folder that cannot be listed.
    pub fn project_paths_in(
        &self,
        numbers: &ProjectNumbers,
        locations: &[PathBuf],
    ) -> Result<ProjectPaths, PathError> {
        let project_number = self.filters.project_number(Some(&numbers.project_number))?;
        let mut install_number = self
            .filters
            .install_number(numbers.install_number.as_deref())?;
        if install_number.is_empty() {
            install_number.clone_from(&project_number);
        }
        let normalized = ProjectNumbers::new(project_number.clone(), Some(install_number.clone()));

        let project_basenames = non_empty(self.filters.apply_filters(
            names::PROJECT_PATH_BASENAMES,
            vec![project_number.clone()],
            &normalized,
        )?);
        let install_basenames = non_empty(self.filters.apply_filters(
            names::INSTALL_PATH_BASENAMES,
            vec![install_number],
            &normalized,
        )?);

        let scan = Scan {
            filters: self.filters,
            project_number: &project_number,
            project_basenames: &project_basenames,
            install_basenames: &install_basenames,
        };

        let mut found = ProjectPaths::default();
        for location in locations {
            for basename in &project_basenames {
                let candidate = location.join(basename);
                if candidate.is_dir() {
                    found.project_paths.push(candidate);
                }
            }
            for basename in &install_basenames {
                let candidate = location.join(basename);
                if candidate.is_dir() {
                    found.install_paths.push(candidate.clone());
                    scan.deep(&candidate, &mut found)?;
                }
            }
        }

        debug!(
            project = %project_number,
            installs = found.install_paths.len(),
            projects = found.project_paths.len(),
            "resolved project paths"
        );
        Ok(found)
    }
}

struct Scan<'s> {
    filters: &'s FilterPipeline,
    project_number: &'s str,
    project_basenames: &'s [String],
    install_basenames: &'s [String],
}

impl Scan<'_> {
    /// Offer every directory inside `install_dir` to the match filters.
    fn deep(&self, install_dir: &Path, found: &mut ProjectPaths) -> Result<(), PathError> {
        let mut nested_installs = Vec::new();

        for name in sorted_dir_names(install_dir)? {
            let path = install_dir.join(&name);
            if !path.is_dir() {
                continue;
            }

            if !self.project_number.is_empty() {
                let candidate = PathCandidate {
                    path: path.clone(),
                    basenames: self.project_basenames.to_vec(),
                };
                if self
                    .filters
                    .apply_filters(names::PROJECT_PATH_IS_MATCH, false, &candidate)?
                {
                    found.project_paths.push(path);
                    continue;
                }
            }

            let candidate = PathCandidate {
                path,
                basenames: self.install_basenames.to_vec(),
            };
            if self
                .filters
                .apply_filters(names::INSTALL_PATH_IS_MATCH, false, &candidate)?
            {
                nested_installs.push(candidate.path);
            }
        }

        found.install_paths.extend(nested_installs);
        Ok(())
    }
}

/// Files and folders inside `dir` that are not ignored, in ascending
/// natural order with folders first.
///
/// # Errors
///
/// Returns [`PathError::Io`] if `dir` cannot be listed.
pub fn list_entries(dir: &Path, filesystem: &FilesystemConfig) -> Result<Vec<PathBuf>, PathError> {
    let mut entries: Vec<PathBuf> = sorted_dir_names(dir)?
        .into_iter()
        .rev()
        .filter(|name| !filesystem.is_ignored(name))
        .map(|name| dir.join(name))
        .collect();
    entries.sort_by_key(|path| !path.is_dir());
    Ok(entries)
}

/// Entry names in `dir`, sorted descending in natural order.
fn sorted_dir_names(dir: &Path) -> Result<Vec<String>, PathError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort_by(|a, b| natural_lexical_cmp(b, a));
    Ok(names)
}

/// Split `path` at its first `*` component into the part before and the
/// part after it.
fn split_wildcard(path: &Path) -> Option<(PathBuf, PathBuf)> {
    let mut base = PathBuf::new();
    let mut components = path.components();
    for component in components.by_ref() {
        if matches!(component, Component::Normal(name) if name == "*") {
            let rest: PathBuf = components.collect();
            return Some((base, rest));
        }
        base.push(component);
    }
    None
}

fn non_empty(basenames: Vec<String>) -> Vec<String> {
    basenames
        .into_iter()
        .filter(|basename| !basename.trim().is_empty())
        .collect()
}
