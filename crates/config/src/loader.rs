use std::path::{Path, PathBuf};

use {
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::StaffChatConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "staffchat.toml",
    "staffchat.yaml",
    "staffchat.yml",
    "staffchat.json",
];

const APP_NAME: &str = "staffchat";

/// Load config from the given path (any supported format).
///
/// The file is layered over [`StaffChatConfig::default`], so a partial
/// `[team]` table keeps the team-specific defaults it does not override.
pub fn load_config(path: &Path) -> anyhow::Result<StaffChatConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&substitute_env(&raw), path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./staffchat.{toml,yaml,yml,json}`
/// 2. `~/.config/staffchat/staffchat.{toml,yaml,yml,json}`
///
/// Returns `StaffChatConfig::default()` if no config file is found or the
/// file fails to load.
pub fn discover_and_load() -> StaffChatConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    StaffChatConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/staffchat/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().to_path_buf())
}

/// Directory holding persisted profile data.
///
/// `data.directory` wins; otherwise the user data dir, falling back to `./`.
pub fn data_dir(config: &StaffChatConfig) -> PathBuf {
    if let Some(dir) = &config.data.directory {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse `raw` by the extension of `path` and layer it over the defaults.
pub(crate) fn parse_config(raw: &str, path: &Path) -> anyhow::Result<StaffChatConfig> {
    let overlay = parse_config_value(raw, path)?;
    let mut merged = serde_json::to_value(StaffChatConfig::default())?;
    merge_values(&mut merged, overlay);
    Ok(serde_json::from_value(merged)?)
}

/// Parse `raw` into a format-neutral value tree.
pub(crate) fn parse_config_value(raw: &str, path: &Path) -> anyhow::Result<Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => {
            let v: toml::Value = toml::from_str(raw)?;
            Ok(serde_json::to_value(v)?)
        },
        "yaml" | "yml" => {
            // An empty YAML document parses to null.
            let v: serde_yaml::Value = serde_yaml::from_str(raw)?;
            match serde_json::to_value(v)? {
                Value::Null => Ok(Value::Object(serde_json::Map::new())),
                other => Ok(other),
            }
        },
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Recursively merge `overlay` into `base`. Objects merge key by key; any
/// other value replaces the base value.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (base, overlay) => *base = overlay,
    }
}
