use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    staffchat_common::{Channel, ParticipantId},
};

/// One participant's toggles for a single channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelToggles {
    /// Set while automatic relay is on; the time it was turned on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_since: Option<DateTime<Utc>>,
    /// Set while opted out; the time the participant left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_since: Option<DateTime<Utc>>,
    pub muted_sounds: bool,
}

impl ChannelToggles {
    pub fn is_default(&self) -> bool {
        self.auto_since.is_none() && self.left_since.is_none() && !self.muted_sounds
    }
}

/// Per-participant chat state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatProfile {
    id: ParticipantId,
    pub staff: ChannelToggles,
    pub team: ChannelToggles,
}

impl ChatProfile {
    pub fn new(id: ParticipantId) -> Self {
        Self::with_toggles(id, ChannelToggles::default(), ChannelToggles::default())
    }

    pub fn with_toggles(id: ParticipantId, staff: ChannelToggles, team: ChannelToggles) -> Self {
        Self { id, staff, team }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn toggles(&self, channel: Channel) -> &ChannelToggles {
        match channel {
            Channel::Staff => &self.staff,
            Channel::Team => &self.team,
        }
    }

    pub fn toggles_mut(&mut self, channel: Channel) -> &mut ChannelToggles {
        match channel {
            Channel::Staff => &mut self.staff,
            Channel::Team => &mut self.team,
        }
    }

    pub fn automatic_chat(&self, channel: Channel) -> bool {
        self.toggles(channel).auto_since.is_some()
    }

    pub fn auto_since(&self, channel: Channel) -> Option<DateTime<Utc>> {
        self.toggles(channel).auto_since
    }

    pub fn since_left(&self, channel: Channel) -> Option<DateTime<Utc>> {
        self.toggles(channel).left_since
    }

    pub fn has_muted_sounds(&self, channel: Channel) -> bool {
        self.toggles(channel).muted_sounds
    }

    /// True when nothing about this profile needs persisting.
    pub fn is_default(&self) -> bool {
        self.staff.is_default() && self.team.is_default()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_is_default() {
        let profile = ChatProfile::new(ParticipantId::new_v4());
        assert!(profile.is_default());
        for channel in Channel::ALL {
            assert!(!profile.automatic_chat(channel));
            assert!(profile.since_left(channel).is_none());
            assert!(!profile.has_muted_sounds(channel));
        }
    }

    #[test]
    fn any_toggle_makes_profile_non_default() {
        let mut profile = ChatProfile::new(ParticipantId::new_v4());
        profile.toggles_mut(Channel::Team).muted_sounds = true;
        assert!(!profile.is_default());
        assert!(profile.staff.is_default());
    }

    #[test]
    fn toggles_serialize_without_empty_timestamps() {
        let json = serde_json::to_value(ChannelToggles::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "muted_sounds": false }));

        let parsed: ChannelToggles = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_default());
    }
}
