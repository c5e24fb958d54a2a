//! Configuration loading, `${ENV}` substitution and validation.
//!
//! Config files: `staffchat.toml`, `staffchat.yaml`, `staffchat.yml` or
//! `staffchat.json`, searched in `./` then `~/.config/staffchat/`.

pub mod env_subst;
pub mod loader;
pub mod messages;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, data_dir, discover_and_load, find_config_file, load_config},
    messages::{ChannelMessages, Formats, MessagesConfig, Notifications, RelayFormats},
    schema::{
        ChannelConfig, DataConfig, NotificationSound, PrefixedChatConfig, RelayConfig,
        RelayTarget, StaffChatConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, check_config, validate, validate_str},
};
