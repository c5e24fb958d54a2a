//! Collaborators supplied by the embedding process.

use std::sync::Arc;

use {
    staffchat_channels::RelayTransport,
    staffchat_common::{Channel, ParticipantId},
    staffchat_config::NotificationSound,
};

/// An online participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Channel access checks.
pub trait PermissionOracle: Send + Sync {
    fn has_staff_access(&self, id: ParticipantId) -> bool;
    fn has_team_access(&self, id: ParticipantId) -> bool;

    fn has_access(&self, id: ParticipantId, channel: Channel) -> bool {
        match channel {
            Channel::Staff => self.has_staff_access(id),
            Channel::Team => self.has_team_access(id),
        }
    }
}

/// The set of connected participants.
pub trait Participants: Send + Sync {
    fn online(&self) -> Vec<Participant>;

    fn find(&self, id: ParticipantId) -> Option<Participant> {
        self.online().into_iter().find(|p| p.id == id)
    }

    /// Send `message` as ordinary public chat from `sender`.
    fn resend_chat(&self, sender: &Participant, message: &str);
}

/// Where rendered text ends up.
pub trait NotificationSink: Send + Sync {
    /// Show `text` to `recipient`, playing `sound` if given.
    fn notify(&self, recipient: &Participant, text: &str, sound: Option<&NotificationSound>);

    fn notify_console(&self, text: &str);
}

/// Everything the bridge needs from its host.
#[derive(Clone)]
pub struct Host {
    pub permissions: Arc<dyn PermissionOracle>,
    pub participants: Arc<dyn Participants>,
    pub sink: Arc<dyn NotificationSink>,
    pub relay: Arc<dyn RelayTransport>,
}
