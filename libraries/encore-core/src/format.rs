//! Display formatting shared by player surfaces

/// Format a millisecond position as a `m:ss` clock string
///
/// Minutes are not wrapped into hours, so long mixes read `73:05`.
pub fn format_millis(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
