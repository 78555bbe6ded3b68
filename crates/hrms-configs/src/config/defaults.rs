// Default value functions

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_workers() -> usize {
    0 // 0 = one worker per CPU
}

pub fn default_keepalive_timeout() -> u64 {
    5
}

pub fn default_database_path() -> String {
    "./data/hrms.sqlite3".to_string()
}

pub fn default_max_connections() -> usize {
    num_cpus::get().clamp(2, 16)
}

pub fn default_acquire_timeout_ms() -> u64 {
    5_000
}

pub fn default_busy_timeout_ms() -> u64 {
    2_000
}

pub fn default_query_timeout_ms() -> u64 {
    30_000 // 0 disables the per-request deadline
}

pub fn default_true() -> bool {
    true
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_cors_methods() -> Vec<String> {
    vec![
        "GET".to_string(),
        "POST".to_string(),
        "PUT".to_string(),
        "DELETE".to_string(),
        "OPTIONS".to_string(),
    ]
}

pub fn default_cors_headers() -> Vec<String> {
    vec!["Content-Type".to_string(), "Authorization".to_string()]
}

pub fn default_cors_max_age() -> u64 {
    3600 // 1 hour
}
