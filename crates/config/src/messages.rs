//! Message templates.
//!
//! Templates use `%name%` placeholders and `&` color codes. Defaults for the
//! team channel reference `%team-prefix%` where the staff channel uses
//! `%prefix%`.

use std::collections::BTreeMap;

use {
    serde::{Deserialize, Serialize},
    staffchat_common::Channel,
};

/// All templates plus user-defined placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Static placeholders available in every template (`prefix`, `team-prefix`, ...).
    pub placeholders: BTreeMap<String, String>,
    pub staff: ChannelMessages,
    pub team: ChannelMessages,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        let placeholders = BTreeMap::from([
            ("prefix".to_string(), "&d(&5&l&oStaff&d)".to_string()),
            ("team-prefix".to_string(), "&b(&3&l&oTeam&b)".to_string()),
        ]);
        Self {
            placeholders,
            staff: ChannelMessages::for_channel(Channel::Staff),
            team: ChannelMessages::for_channel(Channel::Team),
        }
    }
}

impl MessagesConfig {
    pub fn channel(&self, channel: Channel) -> &ChannelMessages {
        match channel {
            Channel::Staff => &self.staff,
            Channel::Team => &self.team,
        }
    }
}

/// Templates for a single channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMessages {
    /// In-game formats, by message source.
    pub formats: Formats,
    /// Formats for text forwarded to the relay.
    pub relay_formats: RelayFormats,
    pub notifications: Notifications,
}

impl ChannelMessages {
    pub fn for_channel(channel: Channel) -> Self {
        let (prefix, name) = match channel {
            Channel::Staff => ("%prefix%", "staff"),
            Channel::Team => ("%team-prefix%", "team"),
        };

        Self {
            formats: Formats {
                player: format!("{prefix} %name%&7:&f %message%"),
                relay: format!("&9&ldiscord &f→ {prefix} %name%&7:&f %message%"),
                console: format!("{prefix} [CONSOLE]&7:&f %message%"),
            },
            relay_formats: RelayFormats::default(),
            notifications: Notifications {
                auto_enabled: format!("{prefix} &2→&a &nEnabled&a automatic {name} chat"),
                auto_disabled: format!("{prefix} &4→&c &nDisabled&c automatic {name} chat"),
                auto_enabled_others: format!(
                    "{prefix} &2→&a %player% &nenabled&a automatic {name} chat"
                ),
                auto_disabled_others: format!(
                    "{prefix} &4→&c %player% &ndisabled&c automatic {name} chat"
                ),
                leave_self: format!(
                    "{prefix} &4→&c You &nleft&c the {name} chat&r\n&8&oYou won't receive any {name} chat messages"
                ),
                leave_others: format!("{prefix} &4→&c %player% &nleft&c the {name} chat"),
                leave_reminder: format!("&8&o(Reminder: you left the {name} chat)"),
                leave_disabled: format!(
                    "{prefix} &6→&e You cannot leave the {name} chat\n&8&oLeaving the {name} chat is currently disabled"
                ),
                join_self: format!(
                    "{prefix} &2→&a You &njoined&a the {name} chat&r\n&8&oYou will now receive {name} chat messages again"
                ),
                join_others: format!("{prefix} &2→&a %player% &njoined&a the {name} chat"),
                sounds_muted: format!("{prefix} &4→&c You have &nmuted&c {name} chat sounds"),
                sounds_unmuted: format!("{prefix} &2→&a You have &nunmuted&a {name} chat sounds"),
            },
        }
    }
}

/// In-game message formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Formats {
    pub player: String,
    /// Messages arriving from the relay.
    pub relay: String,
    pub console: String,
}

impl Default for Formats {
    fn default() -> Self {
        ChannelMessages::for_channel(Channel::Staff).formats
    }
}

/// Relay-side formats. Colors are stripped before sending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayFormats {
    pub player: String,
    pub console: String,
}

impl Default for RelayFormats {
    fn default() -> Self {
        Self {
            player: "**%name%:** %message%".into(),
            console: "**`CONSOLE:`** %message%".into(),
        }
    }
}

/// Toggle and reminder notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub auto_enabled: String,
    pub auto_disabled: String,
    pub auto_enabled_others: String,
    pub auto_disabled_others: String,
    pub leave_self: String,
    pub leave_others: String,
    pub leave_reminder: String,
    pub leave_disabled: String,
    pub join_self: String,
    pub join_others: String,
    pub sounds_muted: String,
    pub sounds_unmuted: String,
}

impl Default for Notifications {
    fn default() -> Self {
        ChannelMessages::for_channel(Channel::Staff).notifications
    }
}
