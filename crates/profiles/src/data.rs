//! In-memory profile store with dirty tracking.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use {
    staffchat_common::ParticipantId,
    tracing::{debug, info, warn},
};

use crate::{
    profile::ChatProfile,
    store::{ProfileStore, StoredProfile},
};

/// Live profiles plus a mirror of what durable storage should hold.
///
/// The mirror is keyed by the identity string as stored, so records whose key
/// is not a valid participant id are carried through every save unchanged.
pub struct ProfileData {
    store: Arc<dyn ProfileStore>,
    persist: bool,
    profiles: HashMap<ParticipantId, ChatProfile>,
    persisted: BTreeMap<String, StoredProfile>,
    dirty: bool,
    /// Cleared when the durable data could not be read, so the unreadable
    /// file is never replaced by this session's partial view.
    writable: bool,
}

impl ProfileData {
    /// Build the store. With persistence on, every stored record with a valid
    /// identity is materialized immediately.
    pub fn load(store: Arc<dyn ProfileStore>, persist: bool) -> Self {
        let mut data = Self {
            store,
            persist,
            profiles: HashMap::new(),
            persisted: BTreeMap::new(),
            dirty: false,
            writable: true,
        };

        if !persist {
            return data;
        }

        let records = match data.store.load_profiles() {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    error = %e,
                    "failed to load profile data, starting empty with saving disabled"
                );
                data.writable = false;
                return data;
            },
        };

        for record in records {
            match record.id.parse::<ParticipantId>() {
                Ok(id) => {
                    let profile =
                        ChatProfile::with_toggles(id, record.staff.clone(), record.team.clone());
                    data.profiles.insert(id, profile);
                    data.persisted.insert(id.to_string(), record);
                },
                Err(e) => {
                    debug!(id = %record.id, error = %e, "skipping profile with malformed id");
                    data.persisted.insert(record.id.clone(), record);
                },
            }
        }

        info!(profiles = data.profiles.len(), "profile data loaded");
        data
    }

    pub fn persist_enabled(&self) -> bool {
        self.persist
    }

    /// `false` after a failed load. Changes then live in memory only.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ChatProfile> {
        self.profiles.values()
    }

    /// Existing profile, if any. Never creates or restores.
    pub fn get(&self, id: ParticipantId) -> Option<&ChatProfile> {
        self.profiles.get(&id)
    }

    /// Existing profile, restoring from durable state or creating a fresh
    /// one as needed.
    pub fn get_or_create(&mut self, id: ParticipantId) -> &ChatProfile {
        self.entry(id)
    }

    fn entry(&mut self, id: ParticipantId) -> &mut ChatProfile {
        let persisted = self.persist.then_some(&self.persisted);
        self.profiles.entry(id).or_insert_with(|| {
            match persisted.and_then(|p| p.get(&id.to_string())) {
                Some(record) => {
                    ChatProfile::with_toggles(id, record.staff.clone(), record.team.clone())
                },
                None => ChatProfile::new(id),
            }
        })
    }

    /// Mutate a profile (creating it if needed), then sync the persisted
    /// mirror. An all-default profile is dropped from the mirror.
    pub fn update<R>(&mut self, id: ParticipantId, f: impl FnOnce(&mut ChatProfile) -> R) -> R {
        let profile = self.entry(id);
        let result = f(profile);

        if self.persist {
            let key = id.to_string();
            let profile = &self.profiles[&id];
            if profile.is_default() {
                self.persisted.remove(&key);
            } else {
                self.persisted.insert(key.clone(), StoredProfile {
                    id: key,
                    staff: profile.staff.clone(),
                    team: profile.team.clone(),
                });
            }
            self.dirty = true;
        }

        result
    }

    /// Evict a profile from memory and from durable state.
    pub fn remove(&mut self, id: ParticipantId) -> Option<ChatProfile> {
        let removed = self.profiles.remove(&id);
        if self.persist && self.persisted.remove(&id.to_string()).is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Write the full persisted mirror if anything changed since the last
    /// successful write. Returns `true` when a write happened.
    ///
    /// On failure the data stays dirty and the next call retries.
    pub fn flush_if_dirty(&mut self) -> bool {
        if !self.persist || !self.dirty {
            return false;
        }
        if !self.writable {
            debug!("profile data was unreadable at startup, not saving");
            return false;
        }

        let records: Vec<StoredProfile> = self.persisted.values().cloned().collect();
        match self.store.save_profiles(&records) {
            Ok(()) => {
                self.dirty = false;
                debug!(records = records.len(), "profile data flushed");
                true
            },
            Err(e) => {
                warn!(error = %e, "failed to save profile data, will retry");
                false
            },
        }
    }
}
