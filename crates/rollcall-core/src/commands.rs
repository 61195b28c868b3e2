//! Administrative commands.
//!
//! The platform authorizes the actor before a command gets here. Parsing
//! accepts the chat syntax admins type:
//!
//! ```text
//! /addstaff <@123>
//! /removestaff <@!123>
//! /setattendancechannel <#456>
//! /setsummarychannel
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channels::ChannelKind;
use crate::model::{ChannelId, StaffId};
use crate::roster::RosterChange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AdminCommand {
    AddStaff {
        staff: Option<StaffId>,
    },
    RemoveStaff {
        staff: Option<StaffId>,
    },
    /// `channel: None` binds the channel the command was issued in.
    SetChannel {
        kind: ChannelKind,
        channel: Option<ChannelId>,
    },
}

/// Where and by whom a command was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub actor: StaffId,
    pub channel: ChannelId,
}

impl AdminCommand {
    /// Parse a chat message. `None` for anything that isn't one of ours.
    pub fn parse(content: &str) -> Option<Self> {
        let mut words = content.trim().strip_prefix('/')?.split_whitespace();
        let name = words.next()?.to_ascii_lowercase();
        let arg = words.next();

        let command = match name.as_str() {
            "addstaff" => AdminCommand::AddStaff {
                staff: arg.and_then(parse_mention).map(StaffId::new),
            },
            "removestaff" => AdminCommand::RemoveStaff {
                staff: arg.and_then(parse_mention).map(StaffId::new),
            },
            "setattendancechannel" => AdminCommand::SetChannel {
                kind: ChannelKind::Attendance,
                channel: arg.and_then(parse_channel).map(ChannelId::new),
            },
            "setsummarychannel" => AdminCommand::SetChannel {
                kind: ChannelKind::Summary,
                channel: arg.and_then(parse_channel).map(ChannelId::new),
            },
            _ => return None,
        };
        Some(command)
    }
}

fn unwrap_brackets<'a>(raw: &'a str, sigils: &[&str]) -> Option<&'a str> {
    let inner = match raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(inner) => sigils.iter().find_map(|s| inner.strip_prefix(s))?,
        None => raw,
    };
    (!inner.is_empty()).then_some(inner)
}

/// `<@id>`, `<@!id>` or a bare id.
fn parse_mention(raw: &str) -> Option<&str> {
    unwrap_brackets(raw, &["@!", "@"])
}

/// `<#id>` or a bare id.
fn parse_channel(raw: &str) -> Option<&str> {
    unwrap_brackets(raw, &["#"])
}

/// Result of a successful command, rendered back to the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum CommandReply {
    Staff { staff: StaffId, change: RosterChange },
    ChannelSet { kind: ChannelKind, channel: ChannelId },
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReply::Staff { staff, change } => match change {
                RosterChange::Added => write!(f, "✅ Added <@{staff}> to the staff list."),
                RosterChange::AlreadyPresent => {
                    f.write_str("⚠️ That user is already on the staff list.")
                }
                RosterChange::Removed => write!(f, "❌ Removed <@{staff}> from the staff list."),
            },
            CommandReply::ChannelSet { kind, channel } => {
                write!(f, "✅ {kind} channel set to <#{channel}>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_staff_mentions() {
        for text in ["/addstaff <@123>", "/addstaff <@!123>", "/AddStaff 123"] {
            assert_eq!(
                AdminCommand::parse(text),
                Some(AdminCommand::AddStaff {
                    staff: Some("123".into())
                }),
                "{text}"
            );
        }
    }

    #[test]
    fn missing_user_still_parses() {
        assert_eq!(
            AdminCommand::parse("/removestaff"),
            Some(AdminCommand::RemoveStaff { staff: None })
        );
        // a channel mention is not a user
        assert_eq!(
            AdminCommand::parse("/addstaff <#5>"),
            Some(AdminCommand::AddStaff { staff: None })
        );
    }

    #[test]
    fn parses_channel_commands() {
        assert_eq!(
            AdminCommand::parse("/setsummarychannel <#77>"),
            Some(AdminCommand::SetChannel {
                kind: ChannelKind::Summary,
                channel: Some("77".into())
            })
        );
        assert_eq!(
            AdminCommand::parse("/setattendancechannel"),
            Some(AdminCommand::SetChannel {
                kind: ChannelKind::Attendance,
                channel: None
            })
        );
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(AdminCommand::parse("hello"), None);
        assert_eq!(AdminCommand::parse("/dance"), None);
        assert_eq!(AdminCommand::parse("/"), None);
    }

    #[test]
    fn replies_render_like_chat_messages() {
        let reply = CommandReply::ChannelSet {
            kind: ChannelKind::Attendance,
            channel: "9".into(),
        };
        assert_eq!(reply.to_string(), "✅ Attendance channel set to <#9>");
    }
}
