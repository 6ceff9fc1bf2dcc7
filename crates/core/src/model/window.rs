use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The server's authoritative start/end time record for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl AttemptWindow {
    /// Seconds between start and end, saturating at zero for inverted windows.
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn test_duration_seconds() {
        let window = AttemptWindow {
            start_time: fixed_now(),
            end_time: fixed_now() + Duration::minutes(10),
        };
        assert_eq!(window.duration_seconds(), 600);
    }

    #[test]
    fn test_inverted_window_saturates() {
        let window = AttemptWindow {
            start_time: fixed_now(),
            end_time: fixed_now() - Duration::minutes(1),
        };
        assert_eq!(window.duration_seconds(), 0);
    }
}
