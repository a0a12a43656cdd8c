//! Ratedposters - rating aggregation and poster annotation for catalog metadata
//!
//! This library crate exposes the pipelines and their collaborators for the
//! binary and for integration testing.

pub mod cache;
pub mod catalog;
pub mod context;
pub mod images;
pub mod metadata;
pub mod pipeline;
pub mod ratings;
