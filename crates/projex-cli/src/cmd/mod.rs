pub mod completions;
pub mod docs;
pub mod hours;
pub mod init_demo;
pub mod list;
pub mod paths;
pub mod planning;
pub mod show;
pub mod tree;

use clap::Args;
use projex_core::db::query::ProjectRef;
use projex_core::hooks::{FilterPipeline, HookError, names};
use projex_core::model::ProjectRecord;

/// Picks one project by number, or by storage id with `--id`.
#[derive(Args, Debug, Clone)]
pub struct ProjectSelector {
    /// Project number, e.g. P-0042.
    #[arg(required_unless_present = "id", conflicts_with = "id")]
    pub number: Option<String>,

    /// Select by storage id instead of number.
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,
}

impl ProjectSelector {
    pub fn project_ref(&self) -> ProjectRef {
        match (&self.id, &self.number) {
            (Some(id), _) => ProjectRef::Id(id.clone()),
            (None, number) => ProjectRef::Number(number.clone().unwrap_or_default()),
        }
    }
}

/// Price as shown to users, through the `project_price` filter. Unpriced
/// projects start from an empty string.
pub fn price_display(filters: &FilterPipeline, project: &ProjectRecord) -> Result<String, HookError> {
    filters.apply_filters(names::PROJECT_PRICE, String::new(), project)
}
