//! The persisted attendance document.
//!
//! ```json
//! {
//!   "staff": ["111", "222"],
//!   "attendance": { "2024-06-10": ["111"] },
//!   "attendanceChannelId": "c1",
//!   "summaryChannelId": null
//! }
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::channels::ChannelBindings;
use crate::model::StaffId;
use crate::roster::Roster;

/// Day-keyed record of who checked in. Each day's set keeps
/// acknowledgement order and never holds an identity twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceLog(BTreeMap<NaiveDate, IndexSet<StaffId>>);

impl AttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `present` into the entry for `day`. Returns how many
    /// identities were new for that day.
    pub fn merge_day<I>(&mut self, day: NaiveDate, present: I) -> usize
    where
        I: IntoIterator<Item = StaffId>,
    {
        let entry = self.0.entry(day).or_default();
        let before = entry.len();
        entry.extend(present);
        entry.len() - before
    }

    pub fn day(&self, day: NaiveDate) -> Option<&IndexSet<StaffId>> {
        self.0.get(&day)
    }

    pub fn was_present(&self, day: NaiveDate, id: &StaffId) -> bool {
        self.0.get(&day).is_some_and(|set| set.contains(id))
    }

    /// Number of `days` on which `id` was present.
    pub fn days_present(&self, id: &StaffId, days: &[NaiveDate]) -> u32 {
        days.iter().filter(|day| self.was_present(**day, id)).count() as u32
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceState {
    #[serde(default)]
    pub staff: Roster,
    #[serde(default)]
    pub attendance: AttendanceLog,
    #[serde(flatten)]
    pub channels: ChannelBindings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChannelId;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn merge_day_absorbs_duplicates() {
        let mut log = AttendanceLog::new();
        let d = day("2024-06-10");
        assert_eq!(log.merge_day(d, ["u1".into(), "u1".into()]), 1);
        assert_eq!(log.merge_day(d, ["u1".into(), "u2".into()]), 1);
        assert_eq!(log.day(d).unwrap().len(), 2);
    }

    #[test]
    fn document_uses_source_field_names() {
        let mut state = AttendanceState::default();
        state.staff.add("111".into());
        state.attendance.merge_day(day("2024-06-10"), ["111".into()]);
        state.channels.attendance_channel_id = Some(ChannelId::new("c1"));

        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["staff"], serde_json::json!(["111"]));
        assert_eq!(json["attendance"]["2024-06-10"], serde_json::json!(["111"]));
        assert_eq!(json["attendanceChannelId"], "c1");
        assert!(json["summaryChannelId"].is_null());
    }

    #[test]
    fn loads_document_without_channel_fields() {
        let state: AttendanceState =
            serde_json::from_str(r#"{"staff":["a"],"attendance":{}}"#).unwrap();
        assert!(state.staff.contains(&"a".into()));
        assert_eq!(state.channels, ChannelBindings::default());
    }
}
