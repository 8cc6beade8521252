//! Repository modules implementing the Lerni store.
//!
//! Each module adds methods to `LerniService` via `impl LerniService` blocks.

pub mod answer;
pub mod concept;
pub mod question;
pub mod review;
