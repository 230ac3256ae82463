//! Deterministic, pure logic shared by the governance pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod branch;
pub mod report;
pub mod rules;
