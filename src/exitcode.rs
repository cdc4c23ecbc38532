//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error (missing path or target)
pub const USAGE: i32 = 64;

/// Data format error (scheme is not well-formed XML)
pub const DATAERR: i32 = 65;

/// Cannot open input (scheme or directory does not exist)
pub const NOINPUT: i32 = 66;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
