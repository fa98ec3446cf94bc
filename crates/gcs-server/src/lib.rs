//! Shared library surface for the ground control server and its tests.

pub mod api;
pub mod backoff;
pub mod config;
pub mod ingest;
pub mod loops;
pub mod state;
