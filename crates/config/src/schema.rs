//! Config schema: channel policy, persistence, relay and messages.

use {
    serde::{Deserialize, Serialize},
    staffchat_common::Channel,
};

use crate::messages::MessagesConfig;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffChatConfig {
    /// Keep toggles across restarts. Defaults to true.
    pub persist_toggles: bool,
    pub data: DataConfig,
    pub staff: ChannelConfig,
    pub team: ChannelConfig,
    pub relay: RelayConfig,
    pub messages: MessagesConfig,
}

impl Default for StaffChatConfig {
    fn default() -> Self {
        Self {
            persist_toggles: true,
            data: DataConfig::default(),
            staff: ChannelConfig::staff(),
            team: ChannelConfig::team(),
            relay: RelayConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

impl StaffChatConfig {
    pub fn channel(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::Staff => &self.staff,
            Channel::Team => &self.team,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelConfig {
        match channel {
            Channel::Staff => &mut self.staff,
            Channel::Team => &mut self.team,
        }
    }

    /// Whether participants may opt out of `channel`.
    pub fn leaving_enabled(&self, channel: Channel) -> bool {
        self.channel(channel).leaving_enabled
    }
}

/// Profile persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `staff-chat.data.json`. Defaults to the user data dir.
    pub directory: Option<String>,
    /// Seconds between flushes of changed toggles. Defaults to 120.
    pub save_interval_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: None,
            save_interval_secs: 120,
        }
    }
}

/// Per-channel policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Whether participants may leave (opt out of) the channel.
    pub leaving_enabled: bool,
    pub prefixed_chat: PrefixedChatConfig,
    pub sound: NotificationSound,
    pub relay: RelayTarget,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::staff()
    }
}

impl ChannelConfig {
    pub fn staff() -> Self {
        Self {
            leaving_enabled: true,
            prefixed_chat: PrefixedChatConfig {
                enabled: false,
                identifier: "@".into(),
            },
            sound: NotificationSound::default(),
            relay: RelayTarget::default(),
        }
    }

    pub fn team() -> Self {
        Self {
            prefixed_chat: PrefixedChatConfig {
                enabled: false,
                identifier: "#".into(),
            },
            ..Self::staff()
        }
    }
}

/// Messages starting with `identifier` are redirected into the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixedChatConfig {
    pub enabled: bool,
    pub identifier: String,
}

impl Default for PrefixedChatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            identifier: "@".into(),
        }
    }
}

/// Sound played alongside channel messages and notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSound {
    pub enabled: bool,
    pub name: String,
    pub volume: f32,
    pub pitch: f32,
}

impl Default for NotificationSound {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "entity.item.pickup".into(),
            volume: 1.0,
            pitch: 0.5,
        }
    }
}

/// Where a channel is mirrored on the relay side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayTarget {
    /// Relay-side channel ID whose messages are routed into this channel.
    pub channel_id: Option<String>,
    /// Webhook that receives outbound messages for this channel.
    pub webhook_url: Option<String>,
}

/// Relay transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    /// Display name used for webhook posts.
    pub username: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 10,
            username: "Staff Chat".into(),
        }
    }
}
