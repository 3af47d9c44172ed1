//! Project hierarchy reconstruction.

pub mod hierarchy;

pub use hierarchy::HierarchyResolver;
