//! `px show`: full details of one project.

use crate::cmd::{ProjectSelector, price_display};
use crate::output::{OutputMode, or_dash, pretty_kv, pretty_rule, pretty_section, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::db::projects;
use projex_core::model::ProjectRecord;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub project: ProjectSelector,
}

#[derive(Debug, Serialize)]
pub struct ShowView {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub price_display: String,
}

/// Execute `px show`.
///
/// # Errors
///
/// Returns an error if the project does not exist or the query fails.
pub fn run_show(args: &ShowArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let project = projects::get_project(&session.filters, &fetcher, &args.project.project_ref())?;
    let view = ShowView {
        price_display: price_display(&session.filters, &project)?,
        project,
    };

    render_mode(output, &view, render_text, render_pretty)
}

fn render_text(view: &ShowView, w: &mut dyn Write) -> std::io::Result<()> {
    let p = &view.project;
    writeln!(w, "project_id\t{}", p.project_id)?;
    writeln!(w, "project_number\t{}", p.project_number)?;
    writeln!(w, "install_number\t{}", p.install_number.as_deref().unwrap_or_default())?;
    writeln!(w, "description\t{}", p.project_description.as_deref().unwrap_or_default())?;
    writeln!(w, "relation\t{}", p.relation_name.as_deref().unwrap_or_default())?;
    writeln!(w, "status\t{}", p.status_name.as_deref().unwrap_or_default())?;
    writeln!(w, "price\t{}", view.price_display)
}

fn render_pretty(view: &ShowView, w: &mut dyn Write) -> std::io::Result<()> {
    let p = &view.project;
    let date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());

    pretty_section(
        w,
        &format!("{}  {}", p.project_number, or_dash(p.project_description.as_deref())),
    )?;
    pretty_kv(w, "Id", &p.project_id)?;
    pretty_kv(w, "Status", or_dash(p.status_name.as_deref()))?;
    pretty_kv(w, "Price", or_dash(Some(view.price_display.as_str())))?;
    pretty_kv(w, "Start", date(p.date_start))?;
    pretty_kv(w, "Finish", date(p.date_finish))?;
    writeln!(w)?;

    pretty_section(w, "Installation")?;
    pretty_kv(w, "Number", or_dash(p.install_number.as_deref()))?;
    pretty_kv(w, "Description", or_dash(p.install_description.as_deref()))?;
    writeln!(w)?;

    pretty_section(w, "Relation")?;
    pretty_kv(w, "Name", or_dash(p.relation_name.as_deref()))?;
    pretty_kv(w, "Country", or_dash(p.relation_country_name.as_deref()))?;
    writeln!(w)?;

    pretty_section(w, "People")?;
    pretty_kv(w, "Sales", or_dash(p.sales_manager_name.as_deref()))?;
    pretty_kv(w, "Manager", or_dash(p.project_manager_name.as_deref()))?;
    pretty_kv(w, "Engineer", or_dash(p.project_engineer_name.as_deref()))?;

    if let Some(notes) = p.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        writeln!(w)?;
        pretty_section(w, "Notes")?;
        writeln!(w, "{notes}")?;
    }
    pretty_rule(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ShowView {
        let mut project = ProjectRecord::new("2", "P-0042");
        project.project_description = Some("Filler upgrade".into());
        project.install_number = Some("I-0042".into());
        ShowView {
            project,
            price_display: "€ 125,500.00".into(),
        }
    }

    #[test]
    fn text_rows_are_key_value() {
        let mut buf = Vec::new();
        render_text(&view(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("project_number\tP-0042\n"));
        assert!(text.contains("install_number\tI-0042\n"));
        assert!(text.contains("price\t€ 125,500.00\n"));
    }

    #[test]
    fn pretty_skips_empty_notes() {
        let mut buf = Vec::new();
        render_pretty(&view(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("P-0042  Filler upgrade\n"));
        assert!(!text.contains("Notes"));
    }

    #[test]
    fn json_flattens_the_record() {
        let json = serde_json::to_value(view()).unwrap();
        assert_eq!(json["project_number"], "P-0042");
        assert_eq!(json["price_display"], "€ 125,500.00");
    }
}
