use chrono::{DateTime, Utc};

/// Renders remaining seconds as `mm:ss`, both fields zero-padded.
pub fn format_countdown(remaining_seconds: u32) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// Hour and minute of a chat message timestamp.
pub fn format_clock(dt: DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_is_zero_padded() {
        assert_eq!(format_countdown(600), "10:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(9), "00:09");
        assert_eq!(format_countdown(0), "00:00");
    }

    #[test]
    fn clock_shows_hours_and_minutes() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 2, 9, 7, 45).unwrap();
        assert_eq!(format_clock(dt), "09:07");
    }
}
