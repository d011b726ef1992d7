//! Domain entities for qzprint.
//!
//! Pure types with no I/O: the print job model and the error taxonomy.

pub mod error;
pub mod job;
