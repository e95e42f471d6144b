//! Stable exit codes for `lawxygen` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config or content, or other errors.
pub const INVALID: i32 = 1;
