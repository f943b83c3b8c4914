//! Default configuration values

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Extra time the blocking call waits past the request timeout before giving up
pub const COMPLETION_GRACE_SECS: u64 = 1;

/// Default request timeout in seconds
pub const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Default TCP connect timeout in seconds
pub const fn default_connect_timeout() -> u64 {
    10
}

/// Default idle time before a pooled connection is closed, in seconds
pub const fn default_pool_idle_timeout() -> u64 {
    90
}

/// Default `User-Agent` header
pub fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

/// Timestamp with millisecond fraction and offset, tried first on decode
pub const FRACTIONAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Timestamp with whole seconds and offset; the fallback on decode and the
/// only format written on encode
pub const WHOLE_SECOND_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Accepted decode formats, in the order they are tried
pub fn default_accepted_formats() -> Vec<String> {
    vec![
        FRACTIONAL_TIMESTAMP_FORMAT.to_string(),
        WHOLE_SECOND_TIMESTAMP_FORMAT.to_string(),
    ]
}

/// Encode format
pub fn default_output_format() -> String {
    WHOLE_SECOND_TIMESTAMP_FORMAT.to_string()
}
