//! Input and update builder types for question mutations.
//!
//! Update structs carry `Option` fields; only `Some` fields are written.
//! Answer content patches use `lerni_core::entities::AnswerFields`.

pub mod question;
