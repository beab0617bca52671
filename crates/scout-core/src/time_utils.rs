/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Returns true when `expires_unix` is present and within `margin_secs` of
/// `now_unix` (or already past it).
pub fn is_expired_unix(expires_unix: Option<u64>, now_unix: u64, margin_secs: u64) -> bool {
    matches!(expires_unix, Some(value) if value.saturating_sub(margin_secs) <= now_unix)
}
