//! Staff/team chat routing.
//!
//! [`StaffChat`] owns the profiles and runs on a single thread. Local chat
//! goes through staged chat listeners (prefix and auto-relay interception),
//! toggles through staged toggle listeners (policy gate and notifiers), and
//! accepted messages are delivered to receiving members, the console and the
//! relay.

pub mod events;
pub mod format;
pub mod host;
pub mod listeners;
mod membership;
mod notify;
pub mod placeholder;
pub mod processor;
pub mod scheduler;
pub mod service;
mod toggle;

pub use {
    events::{ChatEvent, ToggleEvent},
    host::{Host, NotificationSink, Participant, Participants, PermissionOracle},
    placeholder::MappedPlaceholder,
    processor::MessageSource,
    scheduler::{Scheduler, SyncHandle, TICKS_PER_SECOND},
    service::{StaffChat, StaffChatHandle},
};
