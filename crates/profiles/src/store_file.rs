//! JSON file-backed profile store with atomic writes.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::{
    Error, Result,
    error::Context,
    profile::ChannelToggles,
    store::{ProfileStore, StoredProfile},
};

pub const DATA_FILE_NAME: &str = "staff-chat.data.json";

const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Document<R> {
    version: u32,
    #[serde(default = "BTreeMap::new")]
    profiles: BTreeMap<String, R>,
}

#[derive(Serialize)]
struct Record<'a> {
    staff: &'a ChannelToggles,
    team: &'a ChannelToggles,
}

#[derive(Deserialize)]
struct OwnedRecord {
    #[serde(default)]
    staff: ChannelToggles,
    #[serde(default)]
    team: ChannelToggles,
}

/// Single JSON document holding every non-default profile.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `<dir>/staff-chat.data.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    fn atomic_write(&self, json: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())?;

        if self.path.exists() {
            let bak = self.path.with_extension("json.bak");
            let _ = fs::rename(&self.path, &bak);
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProfileStore for FileStore {
    fn load_profiles(&self) -> Result<Vec<StoredProfile>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no profile data yet");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        let doc: Document<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        if doc.version > VERSION {
            return Err(Error::UnsupportedVersion {
                found: doc.version,
                supported: VERSION,
            });
        }

        let mut profiles = Vec::with_capacity(doc.profiles.len());
        for (id, value) in doc.profiles {
            match serde_json::from_value::<OwnedRecord>(value) {
                Ok(record) => profiles.push(StoredProfile {
                    id,
                    staff: record.staff,
                    team: record.team,
                }),
                Err(e) => warn!(id = %id, error = %e, "skipping unreadable profile record"),
            }
        }
        Ok(profiles)
    }

    fn save_profiles(&self, profiles: &[StoredProfile]) -> Result<()> {
        let doc = Document {
            version: VERSION,
            profiles: profiles
                .iter()
                .map(|p| {
                    (p.id.clone(), Record {
                        staff: &p.staff,
                        team: &p.team,
                    })
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        self.atomic_write(&json)?;
        debug!(path = %self.path.display(), count = profiles.len(), "profiles saved");
        Ok(())
    }
}
