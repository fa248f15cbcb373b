//! Butler Core
//!
//! Core types for talking to a Jenkins-style build server.
//!
//! This crate contains:
//! - Domain types: builds, queue items and queue statistics
//! - DTOs: the JSON documents returned by the server's `api/json` endpoints

pub mod domain;
pub mod dto;
