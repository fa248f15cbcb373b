//! Core domain types
//!
//! This module contains the structures callers of the client work with.
//! They are decoupled from the server's JSON layout, which lives in [`crate::dto`].

pub mod job;
pub mod queue;
