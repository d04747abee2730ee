use chrono::{DateTime, Duration, Utc};

/// Global limiter for durable activity-log writes: at most one admitted write
/// per window, whatever the category.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    window: Duration,
    last_write: Option<DateTime<Utc>>,
}

impl LogThrottle {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::milliseconds(window_ms as i64),
            last_write: None,
        }
    }

    pub fn admit(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_write {
            Some(last) if now - last <= self.window => false,
            _ => {
                self.last_write = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_write = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn one_write_per_window() {
        let mut throttle = LogThrottle::new(1_000);
        assert!(throttle.admit(at(0)));
        assert!(!throttle.admit(at(300)));
        assert!(!throttle.admit(at(1_000)));
        assert!(throttle.admit(at(1_001)));
        assert!(!throttle.admit(at(1_500)));
    }
}
