//! Multi-agent teams
//!
//! A [`Team`] is a leader agent whose tools are its members: every member is
//! exposed as a `transfer_task_to_<member>` tool, and calling it runs the
//! member to completion. The leader's streamed output is turned into
//! display-ready [`Fragment`]s at this boundary.

pub mod fragment;
pub mod members;
pub mod team;

pub use fragment::{Fragment, FragmentStream};
pub use members::{Members, transfer_tool_name};
pub use team::{RunOptions, Team, TeamBuilder};
