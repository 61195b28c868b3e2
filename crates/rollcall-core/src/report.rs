//! Weekly attendance rollup.
//!
//! Counts run over the trailing window of calendar days ending today and
//! cover current roster members only, in roster order. Log entries for
//! removed members stay in the log; they simply aren't counted.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::StaffId;
use crate::roster::Roster;
use crate::schedule::trailing_days;
use crate::storage::AttendanceLog;

/// Days present for one roster member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCount {
    pub staff: StaffId,
    pub count: u32,
}

/// Count attendance for each roster member over the `days` days ending
/// with `today`.
pub fn weekly_counts(
    roster: &Roster,
    log: &AttendanceLog,
    today: NaiveDate,
    days: u32,
) -> Vec<AttendanceCount> {
    let window = trailing_days(today, days);
    roster
        .iter()
        .map(|staff| AttendanceCount {
            staff: staff.clone(),
            count: log.days_present(staff, &window),
        })
        .collect()
}

/// Label for members the platform couldn't resolve.
pub fn unknown_label(staff: &StaffId) -> String {
    format!("Unknown ({staff})")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub staff: StaffId,
    pub display_name: String,
    pub count: u32,
    pub out_of: u32,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} days active",
            self.display_name, self.count, self.out_of
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub title: String,
    pub week_ending: NaiveDate,
    pub lines: Vec<ReportLine>,
    /// Shown instead of lines when the roster is empty.
    pub fallback_line: String,
}

impl WeeklyReport {
    /// Build a report, resolving names through `resolve`.
    pub fn build<F>(
        roster: &Roster,
        log: &AttendanceLog,
        today: NaiveDate,
        days: u32,
        title: &str,
        fallback_line: &str,
        resolve: F,
    ) -> Self
    where
        F: Fn(&StaffId) -> Option<String>,
    {
        let lines = weekly_counts(roster, log, today, days)
            .into_iter()
            .map(|AttendanceCount { staff, count }| ReportLine {
                display_name: resolve(&staff).unwrap_or_else(|| unknown_label(&staff)),
                staff,
                count,
                out_of: days,
            })
            .collect();

        Self {
            title: title.to_string(),
            week_ending: today,
            lines,
            fallback_line: fallback_line.to_string(),
        }
    }

    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Lines joined by newlines, or the fallback when there are none.
    pub fn body(&self) -> String {
        if self.lines.is_empty() {
            self.fallback_line.clone()
        } else {
            self.rendered_lines().join("\n")
        }
    }
}
