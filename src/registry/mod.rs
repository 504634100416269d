//! Session registry.
//!
//! Maps caller-chosen aliases to remote sessions, assigns each
//! registration an index, and tracks the current session.

mod alias;
mod cache;

pub use alias::Alias;
pub use cache::{RegistryEntry, SessionRegistry};
