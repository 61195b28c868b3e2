use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ChannelId, StaffId};
use crate::report::WeeklyReport;

/// Every state change the service makes produces an Event.
/// The CLI prints them; embedders can log or forward them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WindowOpened {
        day: NaiveDate,
        channel: ChannelId,
        closes_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    AcknowledgementRecorded {
        day: NaiveDate,
        staff: StaffId,
        at: DateTime<Utc>,
    },
    WindowClosed {
        day: NaiveDate,
        present: usize,
        at: DateTime<Utc>,
    },
    ReportPublished {
        channel: ChannelId,
        week_ending: NaiveDate,
        members: usize,
        at: DateTime<Utc>,
    },
}

/// A request for the platform to post something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    PostPrompt {
        channel: ChannelId,
        text: String,
        /// Reaction the platform seeds on the prompt.
        signal: String,
    },
    PostReport {
        channel: ChannelId,
        report: WeeklyReport,
    },
}
