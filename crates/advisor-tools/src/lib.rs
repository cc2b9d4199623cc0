//! Tool management framework for the finance advisor
//!
//! This crate provides the [`Tool`] trait agents call into and the
//! [`ToolRegistry`] that holds the tools one agent may use.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
