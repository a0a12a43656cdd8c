//! Database query modules.

pub mod ratings;
