//! rp-db: persistent title-to-rating storage.
//!
//! This crate provides SQLite-backed storage with connection pooling and
//! embedded migrations for the ratings used by bulk catalog requests.

pub mod migrations;
pub mod pool;
pub mod queries;
