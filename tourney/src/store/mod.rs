//! Entity storage.
//!
//! [`Repository`] is the seam between the competition core and whatever keeps
//! the entities. [`MemoryStore`] is the in-memory implementation; it serializes
//! as a single snapshot so a front-end can persist it between calls.

pub mod repository;

pub use repository::{EntityKind, IdSequences, MemoryStore, Repository};
