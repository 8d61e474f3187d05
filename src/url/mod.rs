//! URL handling module for Driftnet
//!
//! Links found on fetched pages are normalized here before they become
//! frontier keys, so two spellings of the same page share one entry.

mod normalize;

pub use normalize::normalize_link;
