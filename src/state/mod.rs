//! Per-task and per-record state shared by the crawler, cleaner and sinks
//!
//! # Components
//!
//! - `ContactRecord`: one candidate contact with fixed optional slots
//! - `ContactField`: the named columns of a record, in output order
//! - `Task` / `TaskOutcome`: in-flight work and its classified result

mod contact;
mod task;

pub use contact::{ContactField, ContactRecord, IdentityKey};
pub use task::{Task, TaskOutcome};
