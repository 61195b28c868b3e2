use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::StaffId;

/// One reaction event from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckSignal {
    pub staff: StaffId,
    /// Reaction name as reported by the platform, e.g. `✅`.
    pub kind: String,
    pub at: DateTime<Utc>,
}

impl AckSignal {
    pub fn new(staff: impl Into<StaffId>, kind: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            staff: staff.into(),
            kind: kind.into(),
            at,
        }
    }
}

/// What the controller did with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckOutcome {
    Accepted,
    /// Already counted for this window.
    Duplicate,
    WrongSignal,
    NotStaff,
    /// Timestamp before the window opened or at/after it closes.
    OutsideWindow,
    NoWindow,
}

impl AckOutcome {
    pub fn is_accepted(self) -> bool {
        self == AckOutcome::Accepted
    }
}
