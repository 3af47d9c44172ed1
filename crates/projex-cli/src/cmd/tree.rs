//! `px tree`: the installation hierarchy around one project.

use crate::cmd::ProjectSelector;
use crate::output::{OutputMode, or_dash, render_mode};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use projex_core::db::SqliteFetcher;
use projex_core::graph::HierarchyResolver;
use projex_core::model::{ProjectNode, ProjectTree};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub project: ProjectSelector,
}

/// Execute `px tree`.
///
/// # Errors
///
/// Returns an error if the entry project does not exist or a level query
/// fails.
pub fn run_tree(args: &TreeArgs, session: &Session, output: OutputMode) -> Result<()> {
    let conn = session.connect()?;
    let fetcher = SqliteFetcher::new(&conn);

    let tree = HierarchyResolver::new(&session.filters, &fetcher)
        .project_tree_for(&args.project.project_ref())?;

    render_mode(
        output,
        &tree,
        |tree, w| write_text(w, tree, 0),
        |tree, w| {
            writeln!(w, "{}", node_label(&tree.node))?;
            write_branches(w, &tree.children, "")?;
            writeln!(w, "\n{} node(s)", tree.len())
        },
    )
}

fn node_label(node: &ProjectNode) -> String {
    match node {
        ProjectNode::Resolved(record) => format!(
            "{}  {}  [{}]",
            record.project_number,
            or_dash(record.project_description.as_deref()),
            or_dash(record.status_name.as_deref()),
        ),
        ProjectNode::Phantom(phantom) => format!(
            "{}  {}  (does not exist)",
            phantom.project_number,
            or_dash(phantom.project_description.as_deref()),
        ),
    }
}

fn write_branches(w: &mut dyn Write, children: &[ProjectTree], prefix: &str) -> io::Result<()> {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        writeln!(w, "{prefix}{branch}{}", node_label(&child.node))?;
        write_branches(w, &child.children, &format!("{prefix}{indent}"))?;
    }
    Ok(())
}

/// One row per node: depth, number, id (empty for phantoms), status.
fn write_text(w: &mut dyn Write, tree: &ProjectTree, depth: usize) -> io::Result<()> {
    writeln!(
        w,
        "{depth}\t{}\t{}\t{}",
        tree.node.project_number(),
        tree.node.project_id().unwrap_or_default(),
        tree.node.status_name().unwrap_or_default(),
    )?;
    for child in &tree.children {
        write_text(w, child, depth + 1)?;
    }
    Ok(())
}
