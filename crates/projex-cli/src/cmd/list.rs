//! `px list`: list projects by search terms or status.

use crate::cmd::price_display;
use crate::output::{OutputMode, or_dash, pretty_rule, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use projex_core::db::query::{ProjectQuery, SortOrder};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Search term matched against number, description and relation.
    /// Repeat to require several terms; prefix with `!` to exclude.
    #[arg(long = "search", short = 's', value_name = "TERM")]
    pub search: Vec<String>,

    /// Only projects with this status id. Repeatable.
    #[arg(long, value_name = "STATUS")]
    pub status: Vec<String>,

    /// Oldest first instead of newest first.
    #[arg(long)]
    pub asc: bool,
}

impl ListArgs {
    fn query(&self) -> ProjectQuery {
        let mut query = match (self.search.is_empty(), self.status.is_empty()) {
            (false, _) => ProjectQuery::search(self.search.clone()),
            (true, false) => ProjectQuery::with_status(self.status.clone()),
            (true, true) => ProjectQuery::default(),
        };
        query.order = if self.asc {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };
        query
    }
}

#[derive(Debug, Serialize)]
pub struct ListItem {
    pub project_id: String,
    pub project_number: String,
    pub install_number: Option<String>,
    pub description: Option<String>,
    pub relation: Option<String>,
    pub status: Option<String>,
    pub date_start: Option<String>,
    pub price: String,
}

/// Execute `px list`.
///
/// # Errors
///
/// Returns an error if the database is unavailable or the query fails.
pub fn run_list(args: &ListArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let mut items = Vec::new();
    projects::get_projects(&session.filters, &fetcher, &args.query(), |record| {
        items.push(ListItem {
            price: price_display(&session.filters, &record)?,
            date_start: record.date_start.map(|d| d.to_string()),
            project_id: record.project_id,
            project_number: record.project_number,
            install_number: record.install_number,
            description: record.project_description,
            relation: record.relation_name,
            status: record.status_name,
        });
        Ok(())
    })?;

    render_mode(
        output,
        &items,
        |items, w| {
            for item in items {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    item.project_number,
                    item.install_number.as_deref().unwrap_or_default(),
                    item.status.as_deref().unwrap_or_default(),
                    item.relation.as_deref().unwrap_or_default(),
                    item.description.as_deref().unwrap_or_default(),
                )?;
            }
            Ok(())
        },
        |items, w| {
            writeln!(
                w,
                "{:<12} {:<12} {:<12} {:<14} {:<20} DESCRIPTION",
                "NUMBER", "INSTALL", "STARTED", "STATUS", "RELATION"
            )?;
            pretty_rule(w)?;
            for item in items {
                writeln!(
                    w,
                    "{:<12} {:<12} {:<12} {:<14} {:<20} {}",
                    item.project_number,
                    or_dash(item.install_number.as_deref()),
                    or_dash(item.date_start.as_deref()),
                    or_dash(item.status.as_deref()),
                    or_dash(item.relation.as_deref()),
                    or_dash(item.description.as_deref()),
                )?;
            }
            writeln!(w, "\n{} project(s)", items.len())
        },
    )
}
