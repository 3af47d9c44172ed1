//! Typed records produced from database rows.

mod project;
mod records;
mod row;

pub use project::{PhantomProject, ProjectNode, ProjectNumbers, ProjectRecord, ProjectTree};
pub use records::{AttachedDocument, PlanningTask, Timesheet};
pub use row::{FromRow, MappingError, Row, RowReader};
