/// Constants used throughout the sessionkv codebase
// Configuration defaults
pub const DEFAULT_SAVE_PATH: &str = "tcp://127.0.0.1:6379";
pub const DEFAULT_SESSION_NAME: &str = "SESSIONKV_ID";
pub const DEFAULT_GC_PROBABILITY: u32 = 1;
pub const DEFAULT_GC_DIVISOR: u32 = 100;
pub const DEFAULT_GC_MAX_LIFETIME: u64 = 1440;

// Save path separator between scheme and address
pub const SAVE_PATH_SEPARATOR: &str = "://";

// Save path schemes
pub const SCHEME_TCP: &str = "tcp";
pub const SCHEME_UNIX: &str = "unix";
pub const SCHEME_REDIS: &str = "redis";
pub const SCHEME_FILE: &str = "file";

// Environment variable names
pub const SESSIONKV_SAVE_PATH_VAR: &str = "SESSIONKV_SAVE_PATH";
pub const SESSIONKV_SESSION_NAME_VAR: &str = "SESSIONKV_SESSION_NAME";
pub const SESSIONKV_COOKIE_DOMAIN_VAR: &str = "SESSIONKV_COOKIE_DOMAIN";
pub const SESSIONKV_COOKIE_LIFETIME_VAR: &str = "SESSIONKV_COOKIE_LIFETIME";
pub const SESSIONKV_GC_PROBABILITY_VAR: &str = "SESSIONKV_GC_PROBABILITY";
pub const SESSIONKV_GC_DIVISOR_VAR: &str = "SESSIONKV_GC_DIVISOR";
pub const SESSIONKV_GC_MAX_LIFETIME_VAR: &str = "SESSIONKV_GC_MAX_LIFETIME";
pub const SESSIONKV_LOG_VAR: &str = "SESSIONKV_LOG";

// Session identifiers are hex-encoded SHA-256 digests
pub const SESSION_ID_LEN: usize = 64;
