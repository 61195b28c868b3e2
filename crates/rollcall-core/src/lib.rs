//! # Rollcall Core Library
//!
//! Staff attendance tracking for a chat community: a daily check-in prompt,
//! a time-boxed window for acknowledgements, and a weekly rollup of who
//! showed up. The chat platform itself sits behind the [`Platform`] trait;
//! the clock is whoever calls the service.
//!
//! ## Architecture
//!
//! - **Ledger**: the only write path for durable state (roster, channel
//!   bindings, attendance log). Saves the full document after each mutation
//! - **Check-in Controller**: wall-clock state machine for the daily window.
//!   The caller drives it with `daily_tick()` and `close_due()`
//! - **Weekly Report**: trailing per-member attendance counts
//! - **Storage**: JSON attendance document and TOML configuration
//!
//! ## Key Components
//!
//! - [`AttendanceService`]: entry point for commands, signals and ticks
//! - [`Ledger`]: durable state container
//! - [`CheckinController`]: check-in window state machine
//! - [`Config`]: application configuration management

pub mod channels;
pub mod checkin;
pub mod commands;
pub mod error;
pub mod events;
pub mod ledger;
pub mod model;
pub mod platform;
pub mod report;
pub mod roster;
pub mod schedule;
pub mod service;
pub mod storage;

pub use channels::{ChannelBindings, ChannelKind};
pub use checkin::{AckOutcome, AckSignal, CheckinController, WindowState};
pub use commands::{AdminCommand, CommandContext, CommandReply};
pub use error::{CheckinError, ConfigError, CoreError, DeliveryError, StoreError, ValidationError};
pub use events::{Event, Outbound};
pub use ledger::Ledger;
pub use model::{ChannelId, StaffId};
pub use platform::{Platform, RecordingPlatform};
pub use report::{ReportLine, WeeklyReport};
pub use roster::{Roster, RosterChange};
pub use service::{AttendanceService, ServiceSettings};
pub use storage::{AttendanceLog, AttendanceState, Config, JsonFileStore, MemoryStore, StateStore};
