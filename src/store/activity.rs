use chrono::Duration;
use chrono::Utc;

use chrono::DateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use std::sync::Arc;

/// A labeled span of time. An activity stays open for as long as it is the
/// thing the user is doing right now, and is closed exactly once, either when
/// a new activity supersedes it or when the user clears it.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub text: Arc<str>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub started_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Activity {
    /// Creates a fresh open activity. Callers hand in already trimmed,
    /// non-empty text.
    pub fn started(text: Arc<str>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            started_at: at,
            ended_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Closes the activity. The end is clamped to `started_at` so a skewed
    /// clock can't produce a negative span.
    pub fn close(&mut self, at: DateTime<Utc>) {
        self.ended_at = Some(at.max(self.started_at));
    }

    /// Time spent on the activity. Open activities have no duration yet.
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::Activity;

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    #[test]
    fn test_open_activity_has_no_duration() {
        let activity = Activity::started("writing".into(), Utc.from_utc_datetime(&TEST_START_DATE));
        assert!(activity.is_open());
        assert_eq!(activity.duration(), None);
    }

    #[test]
    fn test_close_sets_duration() {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::started("writing".into(), start);
        activity.close(start + Duration::seconds(90));

        assert!(!activity.is_open());
        assert_eq!(activity.duration(), Some(Duration::seconds(90)));
    }

    #[test]
    fn test_close_clamps_end_before_start() {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::started("writing".into(), start);
        activity.close(start - Duration::seconds(5));

        assert_eq!(activity.ended_at, Some(start));
        assert_eq!(activity.duration(), Some(Duration::zero()));
    }

    #[test]
    fn test_serde_round_trip() {
        let start = Utc.from_utc_datetime(&TEST_START_DATE);
        let mut activity = Activity::started("reviewing PR #42".into(), start);
        activity.close(start + Duration::seconds(61));

        let encoded = serde_json::to_string(&activity).unwrap();
        let decoded: Activity = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, activity);
    }

    #[test]
    fn test_serde_open_activity_round_trip() {
        let activity = Activity::started("writing".into(), Utc.from_utc_datetime(&TEST_START_DATE));

        let encoded = serde_json::to_string(&activity).unwrap();
        let decoded: Activity = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, activity);
        assert!(decoded.is_open());
    }
}
