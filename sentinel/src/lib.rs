//! Governance layer for AI-assisted coding.
//!
//! Sits between a developer's request and a code-generation backend and
//! enforces process rules before anything is shown: test-first generation,
//! a security audit, and branch hygiene. The architecture keeps a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (rule parsing, branch decisions,
//!   reports). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, git, environment).
//! - **[`provider`]**: Generation backends behind the [`provider::Provider`]
//!   trait, selected by key.
//!
//! [`pipeline`] coordinates these into the five-stage `create` run.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod governor;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod render;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
