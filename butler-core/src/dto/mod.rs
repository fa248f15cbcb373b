//! Data Transfer Objects for the server's JSON API
//!
//! These mirror the documents returned by `.../api/json` endpoints. Only the
//! fields the client reads are modeled; everything else is ignored on decode.

pub mod job;
pub mod queue;
pub mod view;
