use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use domain::HealthResult;
use thiserror::Error;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Bangkok;
pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 22;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("alert window start hour {start} must be before end hour {end}")]
    Empty { start: u32, end: u32 },
    #[error("alert window hour {0} is out of range (0-24)")]
    OutOfRange(u32),
}

/// Local-time hours `[start_hour, end_hour)` during which a failed health
/// check may notify someone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertWindow {
    pub timezone: Tz,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for AlertWindow {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl AlertWindow {
    pub fn new(timezone: Tz, start_hour: u32, end_hour: u32) -> Result<Self, WindowError> {
        for hour in [start_hour, end_hour] {
            if hour > 24 {
                return Err(WindowError::OutOfRange(hour));
            }
        }
        if start_hour >= end_hour {
            return Err(WindowError::Empty {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            timezone,
            start_hour,
            end_hour,
        })
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let hour = now.with_timezone(&self.timezone).hour();
        hour >= self.start_hour && hour < self.end_hour
    }

    /// No history is kept: every failure inside the window returns `true`.
    pub fn should_alert(&self, result: &HealthResult, now: DateTime<Utc>) -> bool {
        !result.healthy && self.contains(now)
    }
}

/// Gate with the default 08:00-22:00 window in `timezone`.
pub fn should_alert(result: &HealthResult, now: DateTime<Utc>, timezone: Tz) -> bool {
    AlertWindow {
        timezone,
        ..AlertWindow::default()
    }
    .should_alert(result, now)
}
