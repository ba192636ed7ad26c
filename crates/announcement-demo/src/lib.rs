//! # Announcement Demo
//!
//! Example announcement types and the scenario the `announcement-demo`
//! binary runs.

pub mod events;
pub mod scenario;

pub use scenario::{run, PointerLog, ScenarioReport};
