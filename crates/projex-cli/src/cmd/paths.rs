//! `px paths`: folders that belong to a project on disk.

use crate::output::{OutputMode, pretty_section, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use projex_core::db::query::ProjectRef;
use projex_core::model::ProjectNumbers;
use projex_core::paths::{self, PathResolver, ProjectPaths};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Project number.
    pub number: String,

    /// Install number to search with. Skips the database lookup.
    #[arg(long, value_name = "NUMBER")]
    pub install: Option<String>,

    /// Also list the contents of each folder found.
    #[arg(long)]
    pub files: bool,
}

#[derive(Debug, Serialize)]
pub struct FolderListing {
    pub path: PathBuf,
    pub entries: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PathsReport {
    pub project_number: String,
    pub install_number: Option<String>,
    pub locations: Vec<PathBuf>,
    #[serde(flatten)]
    pub paths: ProjectPaths,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listings: Vec<FolderListing>,
}

/// Execute `px paths`.
///
/// # Errors
///
/// Returns an error if the project lookup fails or a folder cannot be read.
pub fn run_paths(args: &PathsArgs, session: &Session, output: OutputMode) -> Result<()> {
    let numbers = match &args.install {
        Some(install) => ProjectNumbers::new(args.number.clone(), Some(install.clone())),
        None => {
            let conn = session.connect()?;
            let fetcher = SqliteFetcher::new(&conn);
            projects::get_project(
                &session.filters,
                &fetcher,
                &ProjectRef::Number(args.number.clone()),
            )?
            .numbers()
        }
    };

    let filesystem = &session.config.filesystem;
    let resolver = PathResolver::new(&session.filters, &filesystem.lookup_paths);
    let locations = resolver.project_locations()?;
    let found = resolver.project_paths_in(&numbers, &locations)?;

    let mut listings = Vec::new();
    if args.files {
        for path in found.install_paths.iter().chain(&found.project_paths) {
            listings.push(FolderListing {
                path: path.clone(),
                entries: paths::list_entries(path, filesystem)?,
            });
        }
    }

    let report = PathsReport {
        project_number: numbers.project_number,
        install_number: numbers.install_number,
        locations,
        paths: found,
        listings,
    };

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &PathsReport, w: &mut dyn Write) -> std::io::Result<()> {
    for path in &report.paths.install_paths {
        writeln!(w, "install\t{}", path.display())?;
    }
    for path in &report.paths.project_paths {
        writeln!(w, "project\t{}", path.display())?;
    }
    for listing in &report.listings {
        for entry in &listing.entries {
            writeln!(w, "entry\t{}", entry.display())?;
        }
    }
    Ok(())
}

fn render_pretty(report: &PathsReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Folders for {}", report.project_number))?;
    if report.paths.is_empty() {
        writeln!(w, "No folders found in {} location(s).", report.locations.len())?;
        return Ok(());
    }
    write_group(w, "Install", &report.paths.install_paths)?;
    write_group(w, "Project", &report.paths.project_paths)?;

    for listing in &report.listings {
        writeln!(w)?;
        pretty_section(w, &listing.path.display().to_string())?;
        for entry in &listing.entries {
            let name = entry.file_name().map_or_else(
                || entry.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            let marker = if entry.is_dir() { "/" } else { "" };
            writeln!(w, "  {name}{marker}")?;
        }
    }
    Ok(())
}

fn write_group(w: &mut dyn Write, label: &str, paths: &[PathBuf]) -> std::io::Result<()> {
    for path in paths {
        writeln!(w, "{label:<8} {}", path.display())?;
    }
    Ok(())
}
