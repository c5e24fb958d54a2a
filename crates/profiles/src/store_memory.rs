//! In-memory store for testing.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    Error, Result,
    store::{ProfileStore, StoredProfile},
};

/// Holds the last saved snapshot in memory. Counts saves and can be told to
/// fail, for exercising retry paths.
#[derive(Default)]
pub struct InMemoryStore {
    profiles: Mutex<Vec<StoredProfile>>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<StoredProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            ..Self::default()
        }
    }

    /// Make subsequent loads and saves fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<StoredProfile> {
        self.profiles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::message("store unavailable"));
        }
        Ok(())
    }
}

impl ProfileStore for InMemoryStore {
    fn load_profiles(&self) -> Result<Vec<StoredProfile>> {
        self.check()?;
        Ok(self.snapshot())
    }

    fn save_profiles(&self, profiles: &[StoredProfile]) -> Result<()> {
        self.check()?;
        *self.profiles.lock().unwrap_or_else(|e| e.into_inner()) = profiles.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
