//! Channel bindings: where prompts and reports are posted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ChannelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Attendance,
    Summary,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Attendance => f.write_str("Attendance"),
            ChannelKind::Summary => f.write_str("Summary"),
        }
    }
}

/// Both bindings are optional; an unset binding turns the matching
/// scheduled action into a no-op.
///
/// Field names follow the persisted document layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBindings {
    #[serde(default)]
    pub attendance_channel_id: Option<ChannelId>,
    #[serde(default)]
    pub summary_channel_id: Option<ChannelId>,
}

impl ChannelBindings {
    pub fn get(&self, kind: ChannelKind) -> Option<&ChannelId> {
        match kind {
            ChannelKind::Attendance => self.attendance_channel_id.as_ref(),
            ChannelKind::Summary => self.summary_channel_id.as_ref(),
        }
    }

    /// Unconditional overwrite. Reachability is only discovered at post time.
    pub fn set(&mut self, kind: ChannelKind, channel: ChannelId) {
        match kind {
            ChannelKind::Attendance => self.attendance_channel_id = Some(channel),
            ChannelKind::Summary => self.summary_channel_id = Some(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_only_the_named_binding() {
        let mut bindings = ChannelBindings::default();
        bindings.set(ChannelKind::Attendance, "c1".into());
        bindings.set(ChannelKind::Attendance, "c2".into());
        assert_eq!(bindings.get(ChannelKind::Attendance).map(ChannelId::as_str), Some("c2"));
        assert!(bindings.get(ChannelKind::Summary).is_none());
    }
}
