use clap::Subcommand;
use rollcall_core::{AdminCommand, ChannelId, ChannelKind};

use super::{cli_context, ensure_saved, open_service};

#[derive(Subcommand)]
pub enum ChannelAction {
    /// Bind the channel that receives the daily prompt
    Attendance {
        /// Channel ID
        channel: String,
    },
    /// Bind the channel that receives the weekly report
    Summary {
        /// Channel ID
        channel: String,
    },
    /// Show current bindings as JSON
    Show,
}

pub fn run(action: ChannelAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = open_service()?;

    let (kind, channel) = match action {
        ChannelAction::Attendance { channel } => (ChannelKind::Attendance, channel),
        ChannelAction::Summary { channel } => (ChannelKind::Summary, channel),
        ChannelAction::Show => {
            println!("{}", serde_json::to_string_pretty(service.ledger().channels())?);
            return Ok(());
        }
    };

    let command = AdminCommand::SetChannel {
        kind,
        channel: Some(ChannelId::new(channel)),
    };
    let reply = service.handle_command(command, &cli_context())?;
    ensure_saved(&service)?;
    println!("{reply}");
    Ok(())
}
