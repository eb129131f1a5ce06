use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use now::DateTimeNow;

/// Returns the header label used when grouping history entries by day.
pub fn day_label(date: DateTime<Local>, today: DateTime<Local>) -> String {
    let day_start = date.beginning_of_day();
    let today_start = today.beginning_of_day();
    if day_start == today_start {
        "Today".to_string()
    } else if day_start == (today_start - Duration::days(1)).beginning_of_day() {
        "Yesterday".to_string()
    } else {
        date.format("%-d %B %Y").to_string()
    }
}

/// Short clock time, the way rows show their start and end.
pub fn format_time<Tz: TimeZone>(date: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%H:%M").to_string()
}

/// Human scale duration. Sub-minute spans collapse to "< 1m".
pub fn format_duration(v: Duration) -> String {
    let minutes = v.num_minutes();
    if minutes < 1 {
        "< 1m".to_string()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// How long ago a moment was, at the coarsest sensible unit.
pub fn time_ago(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - from).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::{day_label, format_duration, time_ago};

    const TEST_START_DATE: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(),
        NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
    );

    #[test]
    fn test_day_label_today_and_yesterday() {
        let today = Local.from_local_datetime(&TEST_START_DATE).unwrap();

        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(today - Duration::days(1), today), "Yesterday");
        assert_eq!(day_label(today - Duration::days(2), today), "2 July 2018");
    }

    #[test]
    fn test_day_label_ignores_time_of_day() {
        let today = Local.from_local_datetime(&TEST_START_DATE).unwrap();
        let this_morning = today.date_naive().and_hms_opt(0, 5, 0).unwrap();
        let this_morning = Local.from_local_datetime(&this_morning).unwrap();

        assert_eq!(day_label(this_morning, today), "Today");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(30)), "< 1m");
        assert_eq!(format_duration(Duration::minutes(1)), "1m");
        assert_eq!(format_duration(Duration::minutes(59)), "59m");
        assert_eq!(format_duration(Duration::minutes(65)), "1h 5m");
        assert_eq!(format_duration(Duration::hours(26)), "26h 0m");
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.from_utc_datetime(&TEST_START_DATE);

        assert_eq!(time_ago(now - Duration::seconds(10), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }
}
