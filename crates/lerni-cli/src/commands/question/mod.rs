//! Handlers for the question root commands (`new`, `edit`, `show`, ...).

pub mod answer;
pub mod assign;
pub mod create;
pub mod delete;
pub mod list;
pub mod meta;
pub mod show;
