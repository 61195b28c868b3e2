//! Check-in window controller.
//!
//! A wall-clock state machine with no internal timer. The caller opens a
//! window when the daily trigger fires, feeds it acknowledgement signals,
//! and calls [`CheckinController::close_due`] once
//! [`CheckinController::next_deadline`] has passed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Open -> Idle
//! ```
//!
//! At most one window is live. Opening a second one is an error; the live
//! window always runs to its close time.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::signal::{AckOutcome, AckSignal};
use crate::error::CheckinError;
use crate::model::{ChannelId, StaffId};
use crate::roster::Roster;
use crate::schedule::local_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Idle,
    Open,
}

/// The live collection period. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinWindow {
    pub day: NaiveDate,
    pub channel: ChannelId,
    pub opened_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    present: IndexSet<StaffId>,
}

impl CheckinWindow {
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        at >= self.opened_at && at < self.closes_at
    }

    pub fn present_count(&self) -> usize {
        self.present.len()
    }
}

/// A window that reached its close time, ready to merge into the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedWindow {
    pub day: NaiveDate,
    pub channel: ChannelId,
    pub present: Vec<StaffId>,
}

#[derive(Debug, Clone)]
pub struct CheckinController {
    signal: String,
    window_len: TimeDelta,
    utc_offset: FixedOffset,
    window: Option<CheckinWindow>,
}

impl CheckinController {
    pub fn new(signal: impl Into<String>, window_len: TimeDelta, utc_offset: FixedOffset) -> Self {
        Self {
            signal: signal.into(),
            window_len,
            utc_offset,
            window: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> WindowState {
        if self.window.is_some() {
            WindowState::Open
        } else {
            WindowState::Idle
        }
    }

    pub fn window(&self) -> Option<&CheckinWindow> {
        self.window.as_ref()
    }

    /// When the live window must be closed.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.window.as_ref().map(|w| w.closes_at)
    }

    /// Fails while a window is live.
    pub fn ensure_idle(&self) -> Result<(), CheckinError> {
        match &self.window {
            Some(w) => Err(CheckinError::WindowAlreadyOpen {
                day: w.day,
                closes_at: w.closes_at,
            }),
            None => Ok(()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start collecting for the calendar day of `now`.
    pub fn open(
        &mut self,
        channel: ChannelId,
        now: DateTime<Utc>,
    ) -> Result<&CheckinWindow, CheckinError> {
        self.ensure_idle()?;
        let window = self.window.insert(CheckinWindow {
            day: local_day(now, self.utc_offset),
            channel,
            opened_at: now,
            closes_at: now + self.window_len,
            present: IndexSet::new(),
        });
        Ok(&*window)
    }

    pub fn acknowledge(&mut self, signal: &AckSignal, roster: &Roster) -> AckOutcome {
        let outcome = match self.window.as_mut() {
            None => AckOutcome::NoWindow,
            Some(w) if !w.covers(signal.at) => AckOutcome::OutsideWindow,
            Some(_) if signal.kind != self.signal => AckOutcome::WrongSignal,
            Some(_) if !roster.contains(&signal.staff) => AckOutcome::NotStaff,
            Some(w) => {
                if w.present.insert(signal.staff.clone()) {
                    AckOutcome::Accepted
                } else {
                    AckOutcome::Duplicate
                }
            }
        };
        debug!(staff = %signal.staff, kind = %signal.kind, ?outcome, "acknowledgement");
        outcome
    }

    /// Take the window if its close time has been reached.
    pub fn close_due(&mut self, now: DateTime<Utc>) -> Option<ClosedWindow> {
        if self.next_deadline()? > now {
            return None;
        }
        let w = self.window.take()?;
        Some(ClosedWindow {
            day: w.day,
            channel: w.channel,
            present: w.present.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn controller() -> CheckinController {
        CheckinController::new("✅", TimeDelta::hours(12), FixedOffset::east_opt(0).unwrap())
    }

    fn roster() -> Roster {
        ["u1", "u2"].into_iter().map(StaffId::from).collect()
    }

    #[test]
    fn open_acknowledge_close() {
        let mut ctl = controller();
        assert_eq!(ctl.state(), WindowState::Idle);

        let window = ctl.open("c1".into(), utc("2024-06-10T09:00:00Z")).unwrap();
        assert_eq!(window.day, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(window.closes_at, utc("2024-06-10T21:00:00Z"));
        assert_eq!(ctl.state(), WindowState::Open);

        let ack = AckSignal::new("u1", "✅", utc("2024-06-10T09:05:00Z"));
        assert_eq!(ctl.acknowledge(&ack, &roster()), AckOutcome::Accepted);

        assert!(ctl.close_due(utc("2024-06-10T20:59:59Z")).is_none());
        let closed = ctl.close_due(utc("2024-06-10T21:00:00Z")).unwrap();
        assert_eq!(closed.present, vec![StaffId::from("u1")]);
        assert_eq!(ctl.state(), WindowState::Idle);
    }

    #[test]
    fn second_open_is_rejected() {
        let mut ctl = controller();
        ctl.open("c1".into(), utc("2024-06-10T09:00:00Z")).unwrap();
        let err = ctl.open("c1".into(), utc("2024-06-10T10:00:00Z")).unwrap_err();
        assert_eq!(
            err,
            CheckinError::WindowAlreadyOpen {
                day: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                closes_at: utc("2024-06-10T21:00:00Z"),
            }
        );
        // the original window is untouched
        assert_eq!(ctl.window().unwrap().opened_at, utc("2024-06-10T09:00:00Z"));
    }

    #[test]
    fn filters_signals() {
        let mut ctl = controller();
        let roster = roster();
        let early = AckSignal::new("u1", "✅", utc("2024-06-10T08:00:00Z"));
        assert_eq!(ctl.acknowledge(&early, &roster), AckOutcome::NoWindow);

        ctl.open("c1".into(), utc("2024-06-10T09:00:00Z")).unwrap();
        assert_eq!(ctl.acknowledge(&early, &roster), AckOutcome::OutsideWindow);

        let at = utc("2024-06-10T10:00:00Z");
        assert_eq!(
            ctl.acknowledge(&AckSignal::new("u1", "👍", at), &roster),
            AckOutcome::WrongSignal
        );
        assert_eq!(
            ctl.acknowledge(&AckSignal::new("stranger", "✅", at), &roster),
            AckOutcome::NotStaff
        );
        let late = AckSignal::new("u2", "✅", utc("2024-06-10T21:00:00Z"));
        assert_eq!(ctl.acknowledge(&late, &roster), AckOutcome::OutsideWindow);
        assert_eq!(ctl.window().unwrap().present_count(), 0);
    }

    #[test]
    fn repeated_signals_count_once() {
        let mut ctl = controller();
        ctl.open("c1".into(), utc("2024-06-10T09:00:00Z")).unwrap();
        let ack = AckSignal::new("u2", "✅", utc("2024-06-10T11:00:00Z"));
        assert_eq!(ctl.acknowledge(&ack, &roster()), AckOutcome::Accepted);
        assert_eq!(ctl.acknowledge(&ack, &roster()), AckOutcome::Duplicate);
        assert_eq!(ctl.window().unwrap().present_count(), 1);
    }

    #[test]
    fn day_key_follows_reference_offset() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let mut ctl = CheckinController::new("✅", TimeDelta::hours(12), offset);
        // 20:00 UTC on the 9th is 05:00 on the 10th at UTC+9
        let window = ctl.open("c1".into(), utc("2024-06-09T20:00:00Z")).unwrap();
        assert_eq!(window.day, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    }
}
