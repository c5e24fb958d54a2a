//! Membership reconciliation.

use {
    staffchat_common::{Channel, ParticipantId},
    tracing::debug,
};

use crate::{host::Participant, service::StaffChat};

impl StaffChat {
    /// Bring a participant's profile in line with their current access.
    ///
    /// Members get a profile, and are pulled back into channels they left
    /// while leaving is disabled. Non-members have auto-relay turned off
    /// through the normal toggle path, then their profile is dropped from
    /// memory and durable state. Idempotent.
    pub fn reconcile_membership(&mut self, id: ParticipantId) {
        let is_staff = self.host.permissions.has_staff_access(id);
        let is_team = self.host.permissions.has_team_access(id);

        if is_staff || is_team {
            self.profiles.get_or_create(id);
            for (channel, member) in [(Channel::Staff, is_staff), (Channel::Team, is_team)] {
                let left = self
                    .profiles
                    .get(id)
                    .is_some_and(|p| p.since_left(channel).is_some());
                if member && left && !self.config.leaving_enabled(channel) {
                    debug!(%id, %channel, "leaving is disabled, rejoining participant");
                    self.set_receiving(id, channel, true, false);
                }
            }
            return;
        }

        let Some(profile) = self.profiles.get(id).cloned() else {
            return;
        };
        for channel in Channel::ALL {
            if profile.automatic_chat(channel) {
                self.set_automatic_chat(id, channel, false, false);
            }
        }
        self.profiles.remove(id);
        debug!(%id, "access lost, profile removed");
    }

    /// Reconcile a participant who just connected, then remind them of
    /// auto-relay or opt-out state they carried over.
    pub fn on_participant_join(&mut self, participant: &Participant) {
        self.reconcile_membership(participant.id);

        let Some(profile) = self.profiles.get(participant.id) else {
            return;
        };
        for channel in Channel::ALL {
            if !self.has_access(participant.id, channel) {
                continue;
            }
            let notifications = &self.config.messages.channel(channel).notifications;
            if profile.automatic_chat(channel) {
                self.send_notice(channel, participant, &notifications.auto_enabled, None);
            }
            if !self.receives(profile, channel) {
                self.send_notice(channel, participant, &notifications.leave_reminder, None);
            }
        }
    }
}
