use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing dates across application.
/// This can allow it to be used for testing
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
