use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Stable participant identity.
pub type ParticipantId = uuid::Uuid;

/// One of the two relay contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Staff,
    Team,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Staff, Channel::Team];

    /// Game-side channel name, also used as the relay channel key.
    pub fn game_channel(self) -> &'static str {
        match self {
            Self::Staff => "staff-chat",
            Self::Team => "team-chat",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Team => "team",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" | "staff-chat" => Ok(Self::Staff),
            "team" | "team-chat" => Ok(Self::Team),
            other => Err(Error::unknown_channel(other)),
        }
    }
}

/// A per-channel toggle a participant can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAxis {
    /// All normal chat is redirected into the channel.
    AutoRelay,
    /// Channel messages are delivered (`false` means opted out).
    Receiving,
    /// Notification sounds are suppressed.
    MutedSounds,
}

impl fmt::Display for ToggleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AutoRelay => "auto-relay",
            Self::Receiving => "receiving",
            Self::MutedSounds => "muted-sounds",
        };
        f.write_str(name)
    }
}

impl FromStr for ToggleAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" | "auto-relay" | "auto_relay" => Ok(Self::AutoRelay),
            "receiving" | "receive" => Ok(Self::Receiving),
            "mute" | "muted-sounds" | "muted_sounds" | "sounds" => Ok(Self::MutedSounds),
            other => Err(Error::message(format!("unknown toggle: {other}"))),
        }
    }
}
