//! The attendance service: one owner for the ledger, the check-in
//! controller and the platform handle.
//!
//! All entry points run on the caller's single event loop. Scheduled
//! actions never return errors for conditions nobody can act on (unbound
//! channels, failed posts); those are logged and the next scheduled cycle
//! is the retry.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Utc};
use tracing::{error, info, warn};

use crate::channels::ChannelKind;
use crate::checkin::{AckOutcome, AckSignal, CheckinController};
use crate::commands::{AdminCommand, CommandContext, CommandReply};
use crate::error::{CheckinError, Result, StoreError, ValidationError};
use crate::events::Event;
use crate::ledger::Ledger;
use crate::platform::Platform;
use crate::report::WeeklyReport;
use crate::schedule::{local_day, DailyTrigger, WeeklyTrigger};
use crate::storage::{Config, JsonFileStore};

/// Validated runtime settings, usually from [`crate::Config::service_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub utc_offset: FixedOffset,
    pub window: TimeDelta,
    pub daily: DailyTrigger,
    pub weekly: WeeklyTrigger,
    pub prompt_text: String,
    pub signal: String,
    pub report_title: String,
    pub report_fallback: String,
    pub report_days: u32,
}

pub struct AttendanceService<P: Platform> {
    ledger: Ledger,
    checkin: CheckinController,
    platform: P,
    settings: ServiceSettings,
}

impl<P: Platform> AttendanceService<P> {
    pub fn new(ledger: Ledger, platform: P, settings: ServiceSettings) -> Self {
        let checkin = CheckinController::new(
            settings.signal.clone(),
            settings.window,
            settings.utc_offset,
        );
        Self {
            ledger,
            checkin,
            platform,
            settings,
        }
    }

    /// Open the configured attendance document and wire up a service.
    pub fn from_config(config: &Config, platform: P) -> Result<Self> {
        let settings = config.service_settings()?;
        let store = JsonFileStore::new(config.state_path()?);
        let ledger = Ledger::open(Box::new(store), config.seed_bindings())?;
        Ok(Self::new(ledger, platform, settings))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn checkin(&self) -> &CheckinController {
        &self.checkin
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        local_day(now, self.settings.utc_offset)
    }

    pub fn next_daily(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.settings.daily.next_after(now, self.settings.utc_offset)
    }

    pub fn next_weekly(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.settings.weekly.next_after(now, self.settings.utc_offset)
    }

    /// Close time of the live window, if any.
    pub fn next_close(&self) -> Option<DateTime<Utc>> {
        self.checkin.next_deadline()
    }

    /// The report as it would be posted for `today`.
    pub fn build_report(&self, today: NaiveDate) -> WeeklyReport {
        WeeklyReport::build(
            self.ledger.roster(),
            self.ledger.log(),
            today,
            self.settings.report_days,
            &self.settings.report_title,
            &self.settings.report_fallback,
            |staff| self.platform.display_name(staff),
        )
    }

    /// Retry writing the attendance document after a failed save.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.ledger.flush()
    }

    // ── Inbound ──────────────────────────────────────────────────────

    pub fn handle_command(
        &mut self,
        command: AdminCommand,
        ctx: &CommandContext,
    ) -> Result<CommandReply, ValidationError> {
        let reply = match command {
            AdminCommand::AddStaff { staff } => {
                let staff = staff.ok_or(ValidationError::MissingUser { action: "add" })?;
                let change = self.ledger.add_staff(staff.clone());
                CommandReply::Staff { staff, change }
            }
            AdminCommand::RemoveStaff { staff } => {
                let staff = staff.ok_or(ValidationError::MissingUser { action: "remove" })?;
                let change = self.ledger.remove_staff(&staff);
                CommandReply::Staff { staff, change }
            }
            AdminCommand::SetChannel { kind, channel } => {
                let channel = channel.unwrap_or_else(|| ctx.channel.clone());
                self.ledger.set_channel(kind, channel.clone());
                CommandReply::ChannelSet { kind, channel }
            }
        };
        info!(actor = %ctx.actor, %reply, "admin command");
        Ok(reply)
    }

    /// Daily trigger. Opens a window unless no attendance channel is bound
    /// or the prompt can't be posted.
    ///
    /// # Errors
    ///
    /// [`CheckinError::WindowAlreadyOpen`] if the previous window is still
    /// live; the live window is left untouched.
    pub fn daily_tick(&mut self, now: DateTime<Utc>) -> Result<Option<Event>, CheckinError> {
        if let Err(e) = self.checkin.ensure_idle() {
            error!(error = %e, "daily trigger fired while a window is open");
            return Err(e);
        }

        let Some(channel) = self.ledger.channels().get(ChannelKind::Attendance).cloned() else {
            warn!("no attendance channel bound, skipping daily check-in");
            return Ok(None);
        };

        if let Err(e) =
            self.platform
                .post_prompt(&channel, &self.settings.prompt_text, &self.settings.signal)
        {
            error!(platform = self.platform.name(), error = %e, "failed to post check-in prompt");
            return Ok(None);
        }

        let window = self.checkin.open(channel, now)?;
        info!(day = %window.day, closes_at = %window.closes_at, "check-in window opened");
        Ok(Some(Event::WindowOpened {
            day: window.day,
            channel: window.channel.clone(),
            closes_at: window.closes_at,
            at: now,
        }))
    }

    /// Reaction from the platform.
    pub fn acknowledge(&mut self, signal: &AckSignal) -> (AckOutcome, Option<Event>) {
        let outcome = self.checkin.acknowledge(signal, self.ledger.roster());
        let event = match (outcome, self.checkin.window()) {
            (AckOutcome::Accepted, Some(window)) => Some(Event::AcknowledgementRecorded {
                day: window.day,
                staff: signal.staff.clone(),
                at: signal.at,
            }),
            _ => None,
        };
        (outcome, event)
    }

    /// Close the live window if its deadline has passed and merge it into
    /// the log.
    pub fn close_due(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let closed = self.checkin.close_due(now)?;
        let present = closed.present.len();
        self.ledger.record_day(closed.day, closed.present);
        info!(day = %closed.day, present, "check-in window closed");
        Some(Event::WindowClosed {
            day: closed.day,
            present,
            at: now,
        })
    }

    /// Weekly trigger. Posts the rollup unless no summary channel is bound.
    pub fn weekly_tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let Some(channel) = self.ledger.channels().get(ChannelKind::Summary).cloned() else {
            warn!("no summary channel bound, skipping weekly report");
            return None;
        };

        let report = self.build_report(self.today(now));
        if let Err(e) = self.platform.post_report(&channel, &report) {
            error!(platform = self.platform.name(), error = %e, "failed to post weekly report");
            return None;
        }

        info!(%channel, members = report.lines.len(), "weekly report published");
        Some(Event::ReportPublished {
            channel,
            week_ending: report.week_ending,
            members: report.lines.len(),
            at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelBindings;
    use crate::events::Outbound;
    use crate::model::ChannelId;
    use crate::platform::RecordingPlatform;
    use crate::storage::MemoryStore;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn ctx() -> CommandContext {
        CommandContext {
            actor: "admin".into(),
            channel: "here".into(),
        }
    }

    fn service_with(
        bindings: ChannelBindings,
        platform: RecordingPlatform,
    ) -> AttendanceService<RecordingPlatform> {
        let ledger = Ledger::open(Box::new(MemoryStore::new()), bindings).unwrap();
        let settings = Config::default().service_settings().unwrap();
        AttendanceService::new(ledger, platform, settings)
    }

    fn service() -> AttendanceService<RecordingPlatform> {
        service_with(ChannelBindings::default(), RecordingPlatform::new())
    }

    #[test]
    fn add_without_user_is_a_validation_error() {
        let mut svc = service();
        let err = svc
            .handle_command(AdminCommand::AddStaff { staff: None }, &ctx())
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingUser { action: "add" });
        assert!(svc.ledger().roster().is_empty());
    }

    #[test]
    fn set_channel_defaults_to_issuing_channel() {
        let mut svc = service();
        let reply = svc
            .handle_command(
                AdminCommand::SetChannel {
                    kind: ChannelKind::Summary,
                    channel: None,
                },
                &ctx(),
            )
            .unwrap();
        assert_eq!(
            reply,
            CommandReply::ChannelSet {
                kind: ChannelKind::Summary,
                channel: "here".into()
            }
        );
        assert_eq!(
            svc.ledger().channels().get(ChannelKind::Summary),
            Some(&ChannelId::new("here"))
        );
    }

    #[test]
    fn daily_tick_without_channel_stays_idle() {
        let mut svc = service();
        assert_eq!(svc.daily_tick(utc("2024-06-10T09:00:00Z")), Ok(None));
        assert!(svc.next_close().is_none());
        assert!(svc.platform().sent().is_empty());
    }

    #[test]
    fn daily_tick_posts_prompt_and_opens_window() {
        let bindings = ChannelBindings {
            attendance_channel_id: Some("c1".into()),
            summary_channel_id: None,
        };
        let mut svc = service_with(bindings, RecordingPlatform::new());
        let event = svc.daily_tick(utc("2024-06-10T09:00:00Z")).unwrap().unwrap();
        assert!(matches!(event, Event::WindowOpened { .. }));
        assert_eq!(svc.next_close(), Some(utc("2024-06-10T21:00:00Z")));
        match &svc.platform().sent()[0] {
            Outbound::PostPrompt { channel, signal, .. } => {
                assert_eq!(channel.as_str(), "c1");
                assert_eq!(signal, "✅");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_prompt_does_not_open_window() {
        let bindings = ChannelBindings {
            attendance_channel_id: Some("gone".into()),
            summary_channel_id: None,
        };
        let mut svc = service_with(bindings, RecordingPlatform::new().with_unreachable("gone"));
        assert_eq!(svc.daily_tick(utc("2024-06-10T09:00:00Z")), Ok(None));
        assert!(svc.next_close().is_none());
    }

    #[test]
    fn overlapping_daily_tick_is_rejected() {
        let bindings = ChannelBindings {
            attendance_channel_id: Some("c1".into()),
            summary_channel_id: None,
        };
        let mut svc = service_with(bindings, RecordingPlatform::new());
        svc.daily_tick(utc("2024-06-10T09:00:00Z")).unwrap();
        let err = svc.daily_tick(utc("2024-06-10T15:00:00Z")).unwrap_err();
        assert!(matches!(err, CheckinError::WindowAlreadyOpen { .. }));
        // only the first prompt went out
        assert_eq!(svc.platform().sent().len(), 1);
    }

    #[test]
    fn weekly_tick_without_summary_channel_does_nothing() {
        let mut svc = service();
        svc.handle_command(
            AdminCommand::AddStaff {
                staff: Some("u1".into()),
            },
            &ctx(),
        )
        .unwrap();
        assert!(svc.weekly_tick(utc("2024-06-16T10:00:00Z")).is_none());
        assert!(svc.platform().sent().is_empty());
    }

    #[test]
    fn weekly_tick_delivery_failure_is_swallowed() {
        let bindings = ChannelBindings {
            attendance_channel_id: None,
            summary_channel_id: Some("gone".into()),
        };
        let platform = RecordingPlatform::new().with_unreachable("gone");
        let mut svc = service_with(bindings, platform);
        assert!(svc.weekly_tick(utc("2024-06-16T10:00:00Z")).is_none());
        assert!(svc.platform().sent().is_empty());
    }

    #[test]
    fn weekly_report_with_empty_roster_uses_fallback() {
        let bindings = ChannelBindings {
            attendance_channel_id: None,
            summary_channel_id: Some("c2".into()),
        };
        let mut svc = service_with(bindings, RecordingPlatform::new());
        let event = svc.weekly_tick(utc("2024-06-16T10:00:00Z")).unwrap();
        assert!(matches!(event, Event::ReportPublished { members: 0, .. }));
        match &svc.platform().sent()[0] {
            Outbound::PostReport { report, .. } => assert_eq!(report.body(), "No data yet."),
            other => panic!("unexpected {other:?}"),
        }
    }
}
