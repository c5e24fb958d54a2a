//! Shared types, error helpers and the staged listener registry used by every
//! staffchat crate.

pub mod error;
pub mod events;
pub mod types;

pub use {
    error::{Error, FromMessage, Result},
    types::{Channel, ParticipantId, ToggleAxis},
};
