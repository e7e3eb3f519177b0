//! CLI exit codes.
//!
//! Scripts rely on these; keep them stable.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (I/O failure, unknown saved chart)     |
//! | 2    | Usage error (bad arguments, bad position, no file)   |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - the command was well-formed but failed.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown position or template, missing
/// input file. Also what clap exits with on parse errors.
pub const EXIT_USAGE: u8 = 2;
