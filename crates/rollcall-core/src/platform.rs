//! The chat platform seen from the core.
//!
//! Connection handling, permission checks and message rendering all live
//! behind this trait.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::DeliveryError;
use crate::events::Outbound;
use crate::model::{ChannelId, StaffId};
use crate::report::WeeklyReport;

/// Every chat backend implements this trait.
pub trait Platform {
    /// Short identifier used in logs (e.g. "discord", "console").
    fn name(&self) -> &str;

    /// Post the daily prompt and seed `signal` as a reaction on it.
    fn post_prompt(&self, channel: &ChannelId, text: &str, signal: &str)
        -> Result<(), DeliveryError>;

    fn post_report(&self, channel: &ChannelId, report: &WeeklyReport) -> Result<(), DeliveryError>;

    /// Resolve a display name. `None` makes the report use its fallback label.
    fn display_name(&self, _staff: &StaffId) -> Option<String> {
        None // default: unresolvable
    }
}

/// Keeps every request in memory instead of posting it.
///
/// Channels can be marked unreachable to exercise delivery failures.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    sent: RefCell<Vec<Outbound>>,
    names: HashMap<StaffId, String>,
    unreachable: HashSet<ChannelId>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, staff: impl Into<StaffId>, name: impl Into<String>) -> Self {
        self.names.insert(staff.into(), name.into());
        self
    }

    pub fn with_unreachable(mut self, channel: impl Into<ChannelId>) -> Self {
        self.unreachable.insert(channel.into());
        self
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.borrow().clone()
    }

    fn deliver(&self, channel: &ChannelId, message: Outbound) -> Result<(), DeliveryError> {
        if self.unreachable.contains(channel) {
            return Err(DeliveryError::ChannelNotFound(channel.clone()));
        }
        self.sent.borrow_mut().push(message);
        Ok(())
    }
}

impl Platform for RecordingPlatform {
    fn name(&self) -> &str {
        "recording"
    }

    fn post_prompt(
        &self,
        channel: &ChannelId,
        text: &str,
        signal: &str,
    ) -> Result<(), DeliveryError> {
        self.deliver(
            channel,
            Outbound::PostPrompt {
                channel: channel.clone(),
                text: text.to_string(),
                signal: signal.to_string(),
            },
        )
    }

    fn post_report(&self, channel: &ChannelId, report: &WeeklyReport) -> Result<(), DeliveryError> {
        self.deliver(
            channel,
            Outbound::PostReport {
                channel: channel.clone(),
                report: report.clone(),
            },
        )
    }

    fn display_name(&self, staff: &StaffId) -> Option<String> {
        self.names.get(staff).cloned()
    }
}
