//! The single owner of durable state.
//!
//! Every mutating method ends with a full-state save. A failed save is
//! logged and leaves the ledger dirty: the in-memory state stays
//! authoritative and the next mutation (or [`Ledger::flush`]) writes it all.

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::channels::{ChannelBindings, ChannelKind};
use crate::error::StoreError;
use crate::model::{ChannelId, StaffId};
use crate::roster::{Roster, RosterChange};
use crate::storage::{AttendanceLog, AttendanceState, StateStore};

pub struct Ledger {
    state: AttendanceState,
    store: Box<dyn StateStore>,
    dirty: bool,
}

impl Ledger {
    /// Load the saved document, or start from `seed` bindings if nothing
    /// has been saved yet. A fresh ledger is not written until its first
    /// mutation.
    pub fn open(store: Box<dyn StateStore>, seed: ChannelBindings) -> Result<Self, StoreError> {
        let state = match store.load()? {
            Some(state) => {
                info!(
                    staff = state.staff.len(),
                    days = state.attendance.len(),
                    "loaded attendance state"
                );
                state
            }
            None => {
                info!("no saved attendance state, starting fresh");
                AttendanceState {
                    channels: seed,
                    ..AttendanceState::default()
                }
            }
        };
        Ok(Self {
            state,
            store,
            dirty: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AttendanceState {
        &self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.state.staff
    }

    pub fn log(&self) -> &AttendanceLog {
        &self.state.attendance
    }

    pub fn channels(&self) -> &ChannelBindings {
        &self.state.channels
    }

    /// True when the last save attempt failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub fn add_staff(&mut self, id: StaffId) -> RosterChange {
        let change = self.state.staff.add(id);
        if change == RosterChange::Added {
            self.commit();
        }
        change
    }

    pub fn remove_staff(&mut self, id: &StaffId) -> RosterChange {
        if !self.state.staff.contains(id) {
            debug!(staff = %id, "removing a non-member");
        }
        let change = self.state.staff.remove(id);
        self.commit();
        change
    }

    pub fn set_channel(&mut self, kind: ChannelKind, channel: ChannelId) {
        self.state.channels.set(kind, channel);
        self.commit();
    }

    /// Union a closed window's acknowledgements into the log. Returns how
    /// many identities were new for `day`. An empty window leaves no entry.
    pub fn record_day<I>(&mut self, day: NaiveDate, present: I) -> usize
    where
        I: IntoIterator<Item = StaffId>,
    {
        let present: Vec<StaffId> = present.into_iter().collect();
        if present.is_empty() {
            return 0;
        }
        let added = self.state.attendance.merge_day(day, present);
        self.commit();
        added
    }

    /// Retry a failed save.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.store.save(&self.state)?;
        self.dirty = false;
        Ok(())
    }

    fn commit(&mut self) {
        if let Err(e) = self.flush() {
            error!(error = %e, "failed to persist attendance state; keeping in-memory copy");
            self.dirty = true;
        }
    }
}
