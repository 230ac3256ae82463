//! I/O helpers for sentinel commands.

pub mod git;
pub mod init;
pub mod rules;
pub mod settings;
