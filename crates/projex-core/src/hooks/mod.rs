//! Named, priority-ordered extension hooks.
//!
//! - [`HookRegistry`] stores callbacks per hook name and runs them in
//!   priority order.
//! - [`FilterPipeline`] is the shared handle the rest of the crate applies
//!   filters through.
//! - [`names`] is the fixed vocabulary of extension points.
//! - [`defaults`] registers the stock deployment behaviour.

pub mod defaults;
mod filters;
pub mod names;
mod registry;

pub use filters::FilterPipeline;
pub use registry::{
    ActionFn, ActionHook, DEFAULT_PRIORITY, FilterFn, FilterHook, HookError, HookRegistry,
};
