/// Current UTC time in Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Canonical login key: digits only.
///
/// `"(11) 98765-4321"` and `"11987654321"` name the same tenant.
pub fn normalize_login_key(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
