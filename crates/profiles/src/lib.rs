//! Per-participant chat profiles.
//!
//! In-memory profiles with dirty tracking, backed by a durable store at
//! `<data_dir>/staff-chat.data.json`. All-default profiles are never persisted.

pub mod data;
pub mod error;
pub mod profile;
pub mod store;
pub mod store_file;
pub mod store_memory;

pub use {
    data::ProfileData,
    error::{Error, Result},
    profile::{ChannelToggles, ChatProfile},
    store::{ProfileStore, StoredProfile},
};
