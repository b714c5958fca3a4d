//! Display formatting for rank progress.
//!
//! Everything a rank reply shows goes through this module so the CLI and any
//! other front end render counters the same way.

/// Format whole voice minutes as `XhYm`.
///
/// # Examples
/// ```
/// use rankline_types::formatting::format_voice_time;
/// assert_eq!(format_voice_time(0), "0h0m");
/// assert_eq!(format_voice_time(59), "0h59m");
/// assert_eq!(format_voice_time(125), "2h5m");
/// ```
pub fn format_voice_time(minutes: u64) -> String {
    format!("{}h{}m", minutes / 60, minutes % 60)
}

/// Format a counter against its target as `have/need`.
///
/// # Examples
/// ```
/// use rankline_types::formatting::format_progress;
/// assert_eq!(format_progress(12, 20), "12/20");
/// assert_eq!(format_progress(25, 20), "25/20");
/// ```
pub fn format_progress(have: u64, need: u64) -> String {
    format!("{}/{}", have, need)
}

/// Format voice progress as `XhYm/XhYm`.
///
/// # Examples
/// ```
/// use rankline_types::formatting::format_voice_progress;
/// assert_eq!(format_voice_progress(90, 300), "1h30m/5h0m");
/// ```
pub fn format_voice_progress(have_minutes: u64, need_minutes: u64) -> String {
    format!(
        "{}/{}",
        format_voice_time(have_minutes),
        format_voice_time(need_minutes)
    )
}

/// Completion of a single counter towards a target, clamped to `0..=100`.
///
/// A zero target counts as complete.
///
/// # Examples
/// ```
/// use rankline_types::formatting::progress_pct;
/// assert_eq!(progress_pct(5, 20), 25);
/// assert_eq!(progress_pct(40, 20), 100);
/// assert_eq!(progress_pct(0, 0), 100);
/// ```
pub fn progress_pct(have: u64, need: u64) -> u8 {
    if need == 0 || have >= need {
        return 100;
    }
    (u128::from(have) * 100 / u128::from(need)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_voice_time() {
        assert_eq!(format_voice_time(0), "0h0m");
        assert_eq!(format_voice_time(60), "1h0m");
        assert_eq!(format_voice_time(61), "1h1m");
        assert_eq!(format_voice_time(1660), "27h40m");
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(0, 10), "0/10");
        assert_eq!(format_progress(330, 330), "330/330");
    }

    #[test]
    fn test_format_voice_progress() {
        assert_eq!(format_voice_progress(0, 60), "0h0m/1h0m");
        assert_eq!(format_voice_progress(600, 900), "10h0m/15h0m");
    }

    #[test]
    fn test_progress_pct() {
        assert_eq!(progress_pct(0, 10), 0);
        assert_eq!(progress_pct(9, 10), 90);
        assert_eq!(progress_pct(10, 10), 100);
        assert_eq!(progress_pct(3, 7), 42);
    }

    #[test]
    fn test_progress_pct_huge_thresholds() {
        assert_eq!(progress_pct(u64::MAX / 2, u64::MAX), 49);
        assert_eq!(progress_pct(u64::MAX - 1, u64::MAX), 99);
    }
}
