// iislens - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "iislens";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "iislens";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// IIS W3C log format
// =============================================================================

/// Prefix of the in-band column-declaration comment line.
pub const FIELDS_HEADER_PREFIX: &str = "#Fields:";

/// Prefix marking directive/comment lines that carry no record data.
pub const COMMENT_PREFIX: char = '#';

/// Placeholder the log format uses for an absent value. Passed through
/// verbatim at the record layer; numeric accessors treat it as None.
pub const NULL_PLACEHOLDER: &str = "-";

/// Separator between an opaque request token and the account suffix
/// inside the `_RequestID` column.
pub const ACCOUNT_SEPARATOR: char = '@';

// Declared column names, as they appear in the #Fields: line.
pub const FIELD_DATE: &str = "date";
pub const FIELD_TIME: &str = "time";
pub const FIELD_SERVER_NAME: &str = "s-computername";
pub const FIELD_METHOD: &str = "cs-method";
pub const FIELD_URI_STEM: &str = "cs-uri-stem";
pub const FIELD_USER_AGENT: &str = "cs(User-Agent)";
pub const FIELD_REFERER: &str = "cs(Referer)";
pub const FIELD_HOST: &str = "cs-host";
pub const FIELD_STATUS: &str = "sc-status";
pub const FIELD_TIME_TAKEN: &str = "time-taken";
pub const FIELD_REQUEST_ID: &str = "_RequestID";
pub const FIELD_CLIENT_IP: &str = "True-Client-IP";
pub const FIELD_SESSION_ID: &str = "_X-SessionID";

/// Columns a file must declare for projection to succeed. Lookup is by
/// name, so declaration order in the log is irrelevant.
pub const REQUIRED_FIELDS: &[&str] = &[
    FIELD_DATE,
    FIELD_TIME,
    FIELD_SERVER_NAME,
    FIELD_METHOD,
    FIELD_URI_STEM,
    FIELD_USER_AGENT,
    FIELD_REFERER,
    FIELD_HOST,
    FIELD_STATUS,
    FIELD_TIME_TAKEN,
    FIELD_REQUEST_ID,
    FIELD_CLIENT_IP,
    FIELD_SESSION_ID,
];

/// chrono format of the derived `datetime` column (`date` + space + `time`).
/// Used only for best-effort summary statistics; records keep the verbatim
/// string.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Maximum number of log files accepted from a single discovery walk.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns for log file discovery. Matches the
/// log-like extensions accepted from a batch upload; anything else inside
/// a directory is silently ignored.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log", "*.txt"];

/// Default exclude glob patterns for log file discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.zip", "*.bak", "*.tmp"];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
