//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3-9     | run / check      | Row-level results                        |
//! | 10-19   | job              | Job file and snapshot I/O                |
//! | 20-29   | target           | CRM credentials and client setup         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed, every row resolved or already existed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Rows (3-9)
// =============================================================================

/// Run completed but at least one row ended in an error outcome
/// (missing_left, missing_right, batch_lookup_error, submit_error).
/// Also returned by `check` when orphan keys were found.
pub const EXIT_ROW_ERRORS: u8 = 3;

// =============================================================================
// Job (10-19)
// =============================================================================

/// Job file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 10;

/// Job file or a snapshot could not be read, or lacks a configured column.
pub const EXIT_INPUT_READ: u8 = 11;

/// Report, rejects, or filtered/cleaned CSV could not be written.
pub const EXIT_OUTPUT_WRITE: u8 = 12;

// =============================================================================
// Target (20-29)
// =============================================================================

/// No CRM token from --token, CRMSYNC_TOKEN, or the saved auth file.
pub const EXIT_NOT_AUTH: u8 = 20;

/// HTTP client could not be constructed.
pub const EXIT_CLIENT_SETUP: u8 = 21;
