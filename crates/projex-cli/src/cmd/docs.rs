//! `px docs`: documents attached to a project.

use crate::cmd::ProjectSelector;
use crate::output::{OutputMode, pretty_rule, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DocsArgs {
    #[command(flatten)]
    pub project: ProjectSelector,

    /// Include documents marked hidden.
    #[arg(long)]
    pub hidden: bool,
}

/// Execute `px docs`.
///
/// # Errors
///
/// Returns an error if the database is unavailable or the query fails.
pub fn run_docs(args: &DocsArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let mut documents =
        projects::get_attached_documents(&session.filters, &fetcher, &args.project.project_ref())?;
    if !args.hidden {
        documents.retain(|doc| !doc.is_hidden);
    }

    render_mode(
        output,
        &documents,
        |docs, w| {
            for doc in docs {
                writeln!(w, "{}\t{}\t{}", doc.title, doc.version, doc.path)?;
            }
            Ok(())
        },
        |docs, w| {
            writeln!(w, "{:<24} {:>4} {:>10}  PATH", "TITLE", "VER", "SIZE")?;
            pretty_rule(w)?;
            for doc in docs {
                writeln!(
                    w,
                    "{:<24} {:>4} {:>10}  {}{}",
                    doc.title,
                    doc.version,
                    doc.size.map_or_else(|| "-".to_string(), human_size),
                    doc.path,
                    if doc.is_hidden { "  (hidden)" } else { "" },
                )?;
            }
            Ok(())
        },
    )
}

fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024 && unit + 1 < UNITS.len() {
        value /= 1024;
        unit += 1;
    }
    format!("{value} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_scale_by_1024() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(182_344), "178 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5 MB");
    }
}
