//! Trigger times and calendar-day arithmetic in the reference timezone.
//!
//! Nothing here sleeps. Callers ask for the next fire instant and arrange
//! their own timer; the core is invoked when it elapses.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc, Weekday,
};

use crate::error::ConfigError;

/// Calendar day of `at` in the reference timezone.
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// The `days` most recent calendar days ending with `today`, newest first.
pub fn trailing_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..u64::from(days))
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

fn to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))))
}

/// Fires once a day at a fixed local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    pub time: NaiveTime,
}

impl DailyTrigger {
    /// Parse `HH:MM`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            time: parse_time("schedule.daily_time", raw)?,
        })
    }

    /// First fire strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        let local = now.with_timezone(&offset).naive_local();
        let mut candidate = local.date().and_time(self.time);
        if candidate <= local {
            candidate += TimeDelta::days(1);
        }
        to_utc(candidate, offset)
    }
}

/// Fires once a week on a fixed local weekday and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl WeeklyTrigger {
    /// Parse a weekday name (`sun`, `Sunday`, ...) and `HH:MM`.
    pub fn parse(weekday: &str, time: &str) -> Result<Self, ConfigError> {
        let weekday = weekday
            .parse::<Weekday>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "schedule.weekly_day".into(),
                message: format!("'{weekday}' is not a weekday"),
            })?;
        Ok(Self {
            weekday,
            time: parse_time("schedule.weekly_time", time)?,
        })
    }

    /// First fire strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        let local = now.with_timezone(&offset).naive_local();
        let ahead = (7 + self.weekday.num_days_from_monday()
            - local.weekday().num_days_from_monday())
            % 7;
        let mut candidate =
            (local.date() + TimeDelta::days(i64::from(ahead))).and_time(self.time);
        if candidate <= local {
            candidate += TimeDelta::days(7);
        }
        to_utc(candidate, offset)
    }
}

fn parse_time(key: &str, raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not HH:MM ({e})"),
    })
}
