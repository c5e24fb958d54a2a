//! Rendering and fan-out of notices.

use {
    staffchat_common::{Channel, ParticipantId},
    staffchat_config::NotificationSound,
    tracing::debug,
};

use crate::{format::colorful, host::Participant, placeholder::MappedPlaceholder, service::StaffChat};

impl StaffChat {
    pub(crate) fn find_online(&self, id: ParticipantId) -> Option<Participant> {
        self.host.participants.find(id)
    }

    /// Configured placeholders plus the name aliases for `name`.
    pub(crate) fn placeholders_for<'a>(&'a self, name: &'a str) -> MappedPlaceholder<'a> {
        let mut placeholders = MappedPlaceholder::new();
        placeholders.inherit(&self.config.messages.placeholders);
        placeholders.map(&["user", "name", "username", "player", "sender"], move || {
            name.to_string()
        });
        placeholders.map(&["nickname", "displayname"], move || name.to_string());
        placeholders
    }

    pub(crate) fn render(&self, template: &str, placeholders: &MappedPlaceholder<'_>) -> String {
        colorful(&placeholders.update(template))
    }

    /// The channel sound, unless disabled or muted by `recipient`.
    pub(crate) fn sound_for(&self, channel: Channel, recipient: ParticipantId) -> Option<&NotificationSound> {
        let sound = &self.config.channel(channel).sound;
        let muted = self
            .profiles
            .get(recipient)
            .is_some_and(|profile| profile.has_muted_sounds(channel));
        (sound.enabled && !muted).then_some(sound)
    }

    pub(crate) fn notify(&self, channel: Channel, recipient: &Participant, text: &str) {
        self.host
            .sink
            .notify(recipient, text, self.sound_for(channel, recipient.id));
    }

    /// Online participants with access to `channel` who have not opted out.
    pub(crate) fn receiving_members(&self, channel: Channel) -> Vec<Participant> {
        self.host
            .participants
            .online()
            .into_iter()
            .filter(|p| self.has_access(p.id, channel) && self.is_receiving(p.id, channel))
            .collect()
    }

    /// Send `self_template` to `actor` and, if given, `others_template` to the
    /// console and every other receiving member of `channel`.
    pub(crate) fn send_notice(
        &self,
        channel: Channel,
        actor: &Participant,
        self_template: &str,
        others_template: Option<&str>,
    ) {
        let placeholders = self.placeholders_for(&actor.name);
        self.notify(channel, actor, &self.render(self_template, &placeholders));

        let Some(others_template) = others_template else {
            return;
        };
        let text = self.render(others_template, &placeholders);
        self.host.sink.notify_console(&text);
        for member in self.receiving_members(channel) {
            if member.id != actor.id {
                self.notify(channel, &member, &text);
            }
        }
    }

    /// Tell online auto-relay users whether their chat is private.
    pub(crate) fn notify_automatic_users(&self, enabled: bool) {
        for channel in Channel::ALL {
            let notifications = &self.config.messages.channel(channel).notifications;
            let template = if enabled {
                &notifications.auto_enabled
            } else {
                &notifications.auto_disabled
            };

            for participant in self.host.participants.online() {
                if self.has_access(participant.id, channel)
                    && self.is_automatic(participant.id, channel)
                {
                    debug!(%channel, participant = %participant.name, enabled, "auto-relay reminder");
                    self.send_notice(channel, &participant, template, None);
                }
            }
        }
    }
}
