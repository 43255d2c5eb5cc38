use time::OffsetDateTime;

/// Insert `<br />` before every newline, keeping the newline itself.
/// Applied to the raw description on the write path; the stored form is
/// always normalized.
pub fn nl2br(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                out.push_str("<br />\r");
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    out.push('\n');
                }
            }
            '\n' => out.push_str("<br />\n"),
            _ => out.push(c),
        }
    }
    out
}

/// First 40 characters plus an ellipsis; descriptions under 40 characters
/// pass through unchanged.
pub fn short_description(description: &str) -> String {
    if description.chars().count() < 40 {
        return description.to_owned();
    }
    let cut: String = description.chars().take(40).collect();
    format!("{}...", cut)
}

/// Human-relative age of a listing, e.g. "3 hours ago".
pub fn created_at_ago(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let secs = (now - created_at).whole_seconds().max(0);
    let (count, unit) = match secs {
        s if s < MINUTE => (s.max(1), "second"),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < MONTH => (s / DAY, "day"),
        s if s < YEAR => (s / MONTH, "month"),
        s => (s / YEAR, "year"),
    };
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn short_description_passes_through_under_forty_chars() {
        let d = "a".repeat(39);
        assert_eq!(short_description(&d), d);
    }

    #[test]
    fn short_description_truncates_at_forty_chars() {
        let d = "b".repeat(40);
        assert_eq!(short_description(&d), format!("{}...", "b".repeat(40)));

        let d = "c".repeat(45);
        let shortened = short_description(&d);
        assert_eq!(shortened.len(), 43);
        assert_eq!(shortened, format!("{}...", "c".repeat(40)));
    }

    #[test]
    fn nl2br_keeps_the_newline_after_the_break_tag() {
        assert_eq!(nl2br("a\nb"), "a<br />\nb");
        assert_eq!(nl2br("a\r\nb"), "a<br />\r\nb");
        assert_eq!(nl2br("a\rb"), "a<br />\rb");
        assert_eq!(nl2br("no newline"), "no newline");
        assert_eq!(nl2br("two\n\nbreaks"), "two<br />\n<br />\nbreaks");
    }

    #[test]
    fn created_at_ago_picks_the_right_unit() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(1000);
        assert_eq!(created_at_ago(now - Duration::seconds(5), now), "5 seconds ago");
        assert_eq!(created_at_ago(now - Duration::seconds(1), now), "1 second ago");
        assert_eq!(created_at_ago(now - Duration::minutes(2), now), "2 minutes ago");
        assert_eq!(created_at_ago(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(created_at_ago(now - Duration::days(6), now), "6 days ago");
        assert_eq!(created_at_ago(now - Duration::days(65), now), "2 months ago");
        assert_eq!(created_at_ago(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn created_at_ago_never_goes_negative() {
        let now = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(created_at_ago(now + Duration::seconds(30), now), "1 second ago");
    }
}
