//! Toggle state machine.
//!
//! Auto-relay and receiving changes raise a cancellable [`ToggleEvent`]
//! before anything is mutated. Notices go out only once every stage has run
//! and the change was applied. Mute has no pre-event.

use {
    chrono::Utc,
    staffchat_common::{Channel, ParticipantId, ToggleAxis, events::Cancellable},
    tracing::debug,
};

use crate::{events::ToggleEvent, service::StaffChat};

impl StaffChat {
    /// Set `axis` on `channel` to `desired`. Returns `false` if a listener
    /// vetoed the change; nothing is mutated or persisted in that case.
    pub fn set_toggle(
        &mut self,
        id: ParticipantId,
        channel: Channel,
        axis: ToggleAxis,
        desired: bool,
        quiet: bool,
    ) -> bool {
        match axis {
            ToggleAxis::AutoRelay => self.set_automatic_chat(id, channel, desired, quiet),
            ToggleAxis::Receiving => self.set_receiving(id, channel, desired, quiet),
            ToggleAxis::MutedSounds => self.set_muted_sounds(id, channel, desired, quiet),
        }
    }

    pub fn set_automatic_chat(
        &mut self,
        id: ParticipantId,
        channel: Channel,
        enabled: bool,
        quiet: bool,
    ) -> bool {
        self.apply_with_event(id, channel, ToggleAxis::AutoRelay, enabled, quiet)
    }

    /// `receiving = false` opts the participant out of `channel`.
    pub fn set_receiving(
        &mut self,
        id: ParticipantId,
        channel: Channel,
        receiving: bool,
        quiet: bool,
    ) -> bool {
        self.apply_with_event(id, channel, ToggleAxis::Receiving, receiving, quiet)
    }

    /// Always succeeds.
    pub fn set_muted_sounds(
        &mut self,
        id: ParticipantId,
        channel: Channel,
        muted: bool,
        quiet: bool,
    ) -> bool {
        self.profiles
            .update(id, |p| p.toggles_mut(channel).muted_sounds = muted);
        debug!(%id, %channel, muted, "sounds toggled");

        if !quiet && let Some(actor) = self.find_online(id) {
            let notifications = &self.config.messages.channel(channel).notifications;
            let template = if muted {
                &notifications.sounds_muted
            } else {
                &notifications.sounds_unmuted
            };
            self.send_notice(channel, &actor, template, None);
        }
        true
    }

    fn apply_with_event(
        &mut self,
        id: ParticipantId,
        channel: Channel,
        axis: ToggleAxis,
        enabled: bool,
        quiet: bool,
    ) -> bool {
        let profile = self.profiles.get_or_create(id).clone();
        let mut event = ToggleEvent::new(profile, channel, axis, enabled, quiet);
        self.toggle_listeners.dispatch(self, &mut event);

        if event.is_cancelled() {
            debug!(%id, %channel, %axis, enabled, "toggle cancelled");
            return false;
        }

        let now = Utc::now();
        self.profiles.update(id, |p| {
            let toggles = p.toggles_mut(channel);
            match axis {
                ToggleAxis::AutoRelay => toggles.auto_since = enabled.then_some(now),
                ToggleAxis::Receiving => toggles.left_since = (!enabled).then_some(now),
                ToggleAxis::MutedSounds => toggles.muted_sounds = enabled,
            }
        });
        debug!(%id, %channel, %axis, enabled, "toggle applied");
        self.announce_toggle(&event);
        true
    }

    /// Tell the actor and, for auto-relay and status-changing opt-outs, the
    /// rest of the channel. `event.profile` is the state before the change.
    fn announce_toggle(&self, event: &ToggleEvent) {
        let id = event.profile.id();
        let Some(actor) = self.find_online(id).filter(|_| !event.quiet) else {
            return;
        };
        let channel = event.channel;
        let notifications = &self.config.messages.channel(channel).notifications;

        match (event.axis, event.enabled) {
            (ToggleAxis::AutoRelay, true) => self.send_notice(
                channel,
                &actor,
                &notifications.auto_enabled,
                Some(notifications.auto_enabled_others.as_str()),
            ),
            (ToggleAxis::AutoRelay, false) => self.send_notice(
                channel,
                &actor,
                &notifications.auto_disabled,
                Some(notifications.auto_disabled_others.as_str()),
            ),
            (ToggleAxis::Receiving, receiving) => {
                let changed = event.profile.since_left(channel).is_some() == receiving;
                let (own, others) = if receiving {
                    (&notifications.join_self, &notifications.join_others)
                } else {
                    (&notifications.leave_self, &notifications.leave_others)
                };
                self.send_notice(channel, &actor, own, changed.then_some(others.as_str()));
            },
            (ToggleAxis::MutedSounds, _) => {},
        }
    }
}
