//! Stable exit codes for sentinel CLI commands.

/// Command succeeded (for `create`: all five stages passed).
pub const OK: i32 = 0;
/// Generic failure: I/O error, or `init` target already exists.
pub const INVALID: i32 = 1;
/// Rule file malformed or logically inconsistent.
pub const CONFIG: i32 = 2;
/// `--branch-type` / `--branch-name` rejected.
pub const BRANCH_ARGS: i32 = 3;
/// On a protected branch without branch intent.
pub const BRANCH_POLICY: i32 = 4;
/// Version control unreachable or in an unexpected state.
pub const BRANCH_CHECK: i32 = 5;
/// `--provider` not recognized.
pub const UNKNOWN_PROVIDER: i32 = 6;
/// Provider capability call failed.
pub const PROVIDER: i32 = 7;
