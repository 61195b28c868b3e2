//! Stdout-backed platform: every outbound request is printed as one JSON
//! line so a supervising process (or a person) can act on it.

use rollcall_core::{ChannelId, DeliveryError, Outbound, Platform, WeeklyReport};

#[derive(Debug, Default)]
pub struct ConsolePlatform;

impl ConsolePlatform {
    pub fn new() -> Self {
        Self
    }

    fn emit(&self, channel: &ChannelId, message: &Outbound) -> Result<(), DeliveryError> {
        let line = serde_json::to_string(message).map_err(|e| DeliveryError::PostFailed {
            channel: channel.clone(),
            message: e.to_string(),
        })?;
        println!("{line}");
        Ok(())
    }
}

impl Platform for ConsolePlatform {
    fn name(&self) -> &str {
        "console"
    }

    fn post_prompt(
        &self,
        channel: &ChannelId,
        text: &str,
        signal: &str,
    ) -> Result<(), DeliveryError> {
        self.emit(
            channel,
            &Outbound::PostPrompt {
                channel: channel.clone(),
                text: text.to_string(),
                signal: signal.to_string(),
            },
        )
    }

    fn post_report(&self, channel: &ChannelId, report: &WeeklyReport) -> Result<(), DeliveryError> {
        self.emit(
            channel,
            &Outbound::PostReport {
                channel: channel.clone(),
                report: report.clone(),
            },
        )
    }
}
