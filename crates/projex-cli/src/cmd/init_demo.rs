//! `px init-demo`: create the configured database and load the sample
//! dataset into it.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::session::Session;
use anyhow::{Context as _, Result};
use clap::Args;
use projex_core::{db, demo};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitDemoArgs {
    /// Delete an existing database file before seeding.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct InitDemoReport {
    pub path: PathBuf,
    /// `false` when an existing database was reused.
    pub created: bool,
    pub schema_version: u32,
    pub projects: i64,
}

/// Execute `px init-demo`.
///
/// Seeding is idempotent: rows that already exist are kept, so running the
/// command twice leaves the same dataset.
///
/// # Errors
///
/// Returns an error if the old file cannot be removed or the database
/// cannot be created or seeded.
pub fn run_init_demo(args: &InitDemoArgs, session: &Session, output: OutputMode) -> Result<()> {
    let path = session.config.database.path.clone();

    if args.force && path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("remove existing database {}", path.display()))?;
        info!(path = %path.display(), "removed existing database");
    }
    let created = !path.exists();

    let mut conn = db::open_database(&path)?;
    demo::seed(&mut conn).context("seed demo dataset")?;

    let projects: i64 = conn
        .query_row("SELECT count(*) FROM projects", [], |row| row.get(0))
        .context("count seeded projects")?;
    let report = InitDemoReport {
        path,
        created,
        schema_version: db::migrations::current_schema_version(&conn)?,
        projects,
    };
    info!(path = %report.path.display(), projects, "demo database ready");

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(
                w,
                "{}\t{}\t{}",
                r.path.display(),
                if r.created { "created" } else { "updated" },
                r.projects
            )
        },
        |r, w| {
            pretty_section(w, "Demo database")?;
            pretty_kv(w, "Path", r.path.display().to_string())?;
            pretty_kv(w, "State", if r.created { "created" } else { "updated" })?;
            pretty_kv(w, "Schema", format!("v{}", r.schema_version))?;
            pretty_kv(w, "Projects", r.projects.to_string())
        },
    )
}
