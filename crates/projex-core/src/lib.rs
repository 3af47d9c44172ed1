#![forbid(unsafe_code)]
//! projex-core: project hierarchy browsing with deployment hooks.
//!
//! The crate has three layers:
//!
//! - [`hooks`]: a priority-ordered filter registry. Deployments register
//!   callbacks on named extension points (number normalization, SQL text,
//!   folder matching) at bootstrap; the registry is then frozen behind a
//!   [`hooks::FilterPipeline`] and shared.
//! - [`db`] and [`model`]: query builders, a row-streaming
//!   [`db::RecordFetcher`], and typed records mapped from rows.
//! - [`graph`] and [`paths`]: the install-number hierarchy walk and project
//!   folder discovery, both customized through the filter pipeline.

pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod graph;
pub mod hooks;
pub mod model;
pub mod paths;
