//! CLI Exit Code Registry
//!
//! Single source of truth for `gamestock` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | Usage error (bad args, unknown `--publisher`)       |
//! | 3    | Invalid run configuration                           |
//! | 4    | Runtime failure (unreadable or malformed input)     |
//! | 5    | Output could not be written                         |

use gamestock_link::LinkError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Link (3-5)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_LINK_INVALID_CONFIG: u8 = 3;

/// Input file missing, unreadable, or not in a loadable shape.
pub const EXIT_LINK_RUNTIME: u8 = 4;

/// Dataset could not be serialized or written.
pub const EXIT_LINK_OUTPUT: u8 = 5;

/// Map a LinkError to its exit code.
pub fn link_exit_code(err: &LinkError) -> u8 {
    match err {
        LinkError::ConfigParse(_) | LinkError::ConfigValidation(_) => EXIT_LINK_INVALID_CONFIG,
        LinkError::UnknownPublisher(_) => EXIT_USAGE,
        LinkError::InputParse { .. } | LinkError::Io(_) => EXIT_LINK_RUNTIME,
    }
}
