//! Knowledge base for the tutor.
//!
//! An in-memory, append-only list of lessons taught by the admin. Every
//! entry is replayed, in insertion order, into the prompt of each question.

mod entry;
mod store;

pub use entry::*;
pub use store::*;
