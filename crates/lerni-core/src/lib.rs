//! # lerni-core
//!
//! Core types, scheduling, and error types for Lerni.
//!
//! This crate provides the foundational types shared across all Lerni crates:
//! - Entity structs for concepts, questions, answers, and reviews
//! - Status enums with state machine transitions (review recall stages)
//! - ID prefix constants
//! - The error taxonomy shared by the store and the CLI
//! - The SM-2 scheduler (pure, no I/O)
//! - Concept graph traversal and cycle detection over an in-memory edge index
//! - An injectable clock
//! - CLI response types

pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod graph;
pub mod ids;
pub mod responses;
pub mod sm2;
