//! Long-running event loop.
//!
//! One task owns the service. It sleeps until the earliest of the window
//! close, the daily prompt and the weekly report, and meanwhile reads
//! platform events from stdin, one per line:
//!
//! ```text
//! /addstaff <@123>          admin command, issued from channel "console"
//! ack 123 [signal]          reaction by 123 at the current time
//! daily | weekly            fire a trigger now
//! ```

use chrono::{DateTime, Utc};
use clap::Args;
use rollcall_core::{AckSignal, AdminCommand, AttendanceService, CommandContext, Event, Platform};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::open_service;

#[derive(Args)]
pub struct RunArgs {
    /// Stop when stdin reaches end of file
    #[arg(long)]
    exit_on_eof: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let service = open_service()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(service, args))
}

/// Next fire instant of each scheduled trigger. A deadline only moves
/// forward once its own trigger has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deadlines {
    daily: DateTime<Utc>,
    weekly: DateTime<Utc>,
}

impl Deadlines {
    fn after<P: Platform>(service: &AttendanceService<P>, now: DateTime<Utc>) -> Self {
        Self {
            daily: service.next_daily(now),
            weekly: service.next_weekly(now),
        }
    }

    fn earliest(&self, close: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let next = self.daily.min(self.weekly);
        close.map_or(next, |close| close.min(next))
    }
}

/// Run everything due at `now`: close first, so a window ending on the
/// next prompt makes room for it, then the daily and weekly triggers.
fn run_due<P: Platform>(
    service: &mut AttendanceService<P>,
    deadlines: &mut Deadlines,
    now: DateTime<Utc>,
) -> Vec<Event> {
    let mut events: Vec<Event> = service.close_due(now).into_iter().collect();
    if deadlines.daily <= now {
        events.extend(open_daily(service, now));
        deadlines.daily = service.next_daily(now);
    }
    if deadlines.weekly <= now {
        events.extend(service.weekly_tick(now));
        deadlines.weekly = service.next_weekly(now);
    }
    events
}

fn open_daily<P: Platform>(service: &mut AttendanceService<P>, now: DateTime<Utc>) -> Vec<Event> {
    let mut events: Vec<Event> = service.close_due(now).into_iter().collect();
    // overlap is already logged by the service
    if let Ok(Some(event)) = service.daily_tick(now) {
        events.push(event);
    }
    events
}

fn emit(events: impl IntoIterator<Item = Event>) {
    for event in events {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "failed to serialize event"),
        }
    }
}

async fn sleep_until(at: DateTime<Utc>) {
    let wait = (at - Utc::now()).to_std().unwrap_or_default();
    tokio::time::sleep(wait).await;
}

fn handle_line<P: Platform>(service: &mut AttendanceService<P>, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    if line.starts_with('/') {
        let Some(command) = AdminCommand::parse(line) else {
            warn!(%line, "unknown command");
            return;
        };
        let ctx = CommandContext {
            actor: "console".into(),
            channel: "console".into(),
        };
        match service.handle_command(command, &ctx) {
            Ok(reply) => println!("{}", serde_json::json!({ "reply": reply.to_string() })),
            Err(e) => println!("{}", serde_json::json!({ "error": format!("❌ {e}") })),
        }
        return;
    }

    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("ack"), Some(staff), signal) => {
            let kind = signal.unwrap_or(&service.settings().signal).to_string();
            let (outcome, event) = service.acknowledge(&AckSignal::new(staff, kind, Utc::now()));
            info!(%staff, ?outcome, "reaction");
            emit(event);
        }
        (Some("daily"), None, None) => emit(open_daily(service, Utc::now())),
        (Some("weekly"), None, None) => emit(service.weekly_tick(Utc::now())),
        _ => warn!(%line, "unrecognized input"),
    }
}

async fn event_loop<P: Platform>(
    mut service: AttendanceService<P>,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut deadlines = Deadlines::after(&service, Utc::now());
    info!(
        next_daily = %deadlines.daily,
        next_weekly = %deadlines.weekly,
        "rollcall running"
    );

    loop {
        let wake = deadlines.earliest(service.next_close());

        tokio::select! {
            biased;
            _ = sleep_until(wake) => {
                emit(run_due(&mut service, &mut deadlines, Utc::now()));
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => handle_line(&mut service, &line),
                None if args.exit_on_eof => break,
                None => stdin_open = false,
            },
        }
    }

    if service.ledger().is_dirty() {
        service.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{ChannelBindings, Config, Ledger, MemoryStore, Outbound, RecordingPlatform};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn service(config: &Config) -> AttendanceService<RecordingPlatform> {
        let bindings = ChannelBindings {
            attendance_channel_id: Some("c1".into()),
            summary_channel_id: Some("c2".into()),
        };
        let ledger = Ledger::open(Box::new(MemoryStore::new()), bindings).unwrap();
        let settings = config.service_settings().unwrap();
        AttendanceService::new(ledger, RecordingPlatform::new(), settings)
    }

    fn kinds(events: &[Event]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                Event::WindowOpened { .. } => "opened",
                Event::AcknowledgementRecorded { .. } => "ack",
                Event::WindowClosed { .. } => "closed",
                Event::ReportPublished { .. } => "report",
            })
            .collect()
    }

    #[test]
    fn nothing_runs_before_a_deadline() {
        let mut svc = service(&Config::default());
        let mut deadlines = Deadlines::after(&svc, utc("2024-06-10T08:00:00Z"));
        let before = deadlines;
        assert!(run_due(&mut svc, &mut deadlines, utc("2024-06-10T08:59:59Z")).is_empty());
        assert_eq!(deadlines, before);
    }

    #[test]
    fn full_day_window_closes_and_reopens_on_the_same_tick() {
        let mut config = Config::default();
        config.schedule.window_hours = 24;
        let mut svc = service(&config);
        let mut deadlines = Deadlines::after(&svc, utc("2024-06-10T08:00:00Z"));

        let first = utc("2024-06-10T09:00:00Z");
        assert_eq!(deadlines.earliest(svc.next_close()), first);
        assert_eq!(kinds(&run_due(&mut svc, &mut deadlines, first)), vec!["opened"]);

        // the close and the next prompt fall on the same instant
        let second = utc("2024-06-11T09:00:00Z");
        assert_eq!(svc.next_close(), Some(second));
        assert_eq!(deadlines.earliest(svc.next_close()), second);
        assert_eq!(
            kinds(&run_due(&mut svc, &mut deadlines, second)),
            vec!["closed", "opened"]
        );
        assert_eq!(deadlines.daily, utc("2024-06-12T09:00:00Z"));
        assert_eq!(svc.next_close(), Some(utc("2024-06-12T09:00:00Z")));
    }

    #[test]
    fn daily_and_weekly_at_the_same_time_both_fire() {
        let mut config = Config::default();
        config.schedule.weekly_time = "09:00".into();
        let mut svc = service(&config);
        // 2024-06-16 is a Sunday
        let mut deadlines = Deadlines::after(&svc, utc("2024-06-16T08:00:00Z"));
        let at = utc("2024-06-16T09:00:00Z");
        assert_eq!(deadlines.daily, at);
        assert_eq!(deadlines.weekly, at);

        assert_eq!(
            kinds(&run_due(&mut svc, &mut deadlines, at)),
            vec!["opened", "report"]
        );
        assert_eq!(deadlines.daily, utc("2024-06-17T09:00:00Z"));
        assert_eq!(deadlines.weekly, utc("2024-06-23T09:00:00Z"));
        let sent = svc.platform().sent();
        assert!(matches!(sent[0], Outbound::PostPrompt { .. }));
        assert!(matches!(sent[1], Outbound::PostReport { .. }));
    }

    #[test]
    fn late_wakeup_fires_once_and_moves_past_now() {
        let mut svc = service(&Config::default());
        let mut deadlines = Deadlines::after(&svc, utc("2024-06-10T08:00:00Z"));
        let late = utc("2024-06-10T09:00:05Z");
        assert_eq!(kinds(&run_due(&mut svc, &mut deadlines, late)), vec!["opened"]);
        assert_eq!(deadlines.daily, utc("2024-06-11T09:00:00Z"));
        assert!(run_due(&mut svc, &mut deadlines, late).is_empty());
    }
}
