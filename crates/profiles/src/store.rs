//! Durable storage for profile toggles.

use serde::{Deserialize, Serialize};

use crate::{Result, profile::ChannelToggles};

/// A persisted profile record.
///
/// `id` is kept as written so records with malformed identities survive a
/// load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: String,
    #[serde(default)]
    pub staff: ChannelToggles,
    #[serde(default)]
    pub team: ChannelToggles,
}

/// Persistence backend for profile toggles.
///
/// Saves always receive the complete set of records.
pub trait ProfileStore: Send + Sync {
    fn load_profiles(&self) -> Result<Vec<StoredProfile>>;
    fn save_profiles(&self, profiles: &[StoredProfile]) -> Result<()>;
}
