use std::path::Path;

use {
    anyhow::Result,
    clap::Subcommand,
    staffchat_profiles::{ChannelToggles, ProfileStore, store_file::FileStore},
};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List every persisted profile.
    List,
    /// Delete the persisted profile of a participant.
    Clear {
        /// Participant id, as stored.
        id: String,
    },
}

pub fn handle_profiles(action: ProfileAction, path: Option<&Path>) -> Result<()> {
    let config = crate::load_config(path)?;
    let store = FileStore::in_dir(&staffchat_config::data_dir(&config));

    match action {
        ProfileAction::List => {
            let profiles = store.load_profiles()?;
            if profiles.is_empty() {
                println!("No profiles stored in {}.", store.path().display());
                return Ok(());
            }
            for profile in &profiles {
                println!(
                    "{}  staff: {}  team: {}",
                    profile.id,
                    describe(&profile.staff),
                    describe(&profile.team)
                );
            }
        },
        ProfileAction::Clear { id } => {
            let mut profiles = store.load_profiles()?;
            let before = profiles.len();
            profiles.retain(|p| p.id != id);
            if profiles.len() == before {
                println!("No profile stored for {id}.");
                return Ok(());
            }
            store.save_profiles(&profiles)?;
            println!("Removed profile {id}.");
        },
    }

    Ok(())
}

/// One-line summary of a channel's toggles.
pub(crate) fn describe(toggles: &ChannelToggles) -> String {
    let mut parts = Vec::new();
    if let Some(since) = toggles.auto_since {
        parts.push(format!("auto since {}", since.format("%Y-%m-%d %H:%M")));
    }
    if let Some(since) = toggles.left_since {
        parts.push(format!("left since {}", since.format("%Y-%m-%d %H:%M")));
    }
    if toggles.muted_sounds {
        parts.push("muted".to_string());
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_defaults_as_dash() {
        assert_eq!(describe(&ChannelToggles::default()), "-");
    }

    #[test]
    fn describe_lists_active_toggles() {
        let since = "2024-05-01T12:30:00Z".parse().unwrap();
        let toggles = ChannelToggles {
            left_since: Some(since),
            muted_sounds: true,
            ..ChannelToggles::default()
        };
        assert_eq!(describe(&toggles), "left since 2024-05-01 12:30, muted");
    }

    #[test]
    fn clear_removes_only_the_named_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        let record = |id: &str| staffchat_profiles::StoredProfile {
            id: id.into(),
            staff: ChannelToggles {
                muted_sounds: true,
                ..ChannelToggles::default()
            },
            team: ChannelToggles::default(),
        };
        store.save_profiles(&[record("a"), record("b")]).unwrap();

        let config_path = dir.path().join("staffchat.toml");
        std::fs::write(
            &config_path,
            format!("[data]\ndirectory = {:?}\n", dir.path().display().to_string()),
        )
        .unwrap();

        handle_profiles(
            ProfileAction::Clear { id: "a".into() },
            Some(&config_path),
        )
        .unwrap();

        let left: Vec<String> = store
            .load_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(left, vec!["b".to_string()]);
    }
}
