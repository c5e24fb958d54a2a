//! The bridge facade, owned by the main thread.

use std::sync::Arc;

use {
    staffchat_channels::{InboundRelayMessage, RelayRouter},
    staffchat_common::{
        Channel, ParticipantId,
        events::{Cancellable, Listener, ListenerRegistry},
    },
    staffchat_config::StaffChatConfig,
    staffchat_profiles::{ChatProfile, ProfileData, ProfileStore},
    tracing::{debug, info},
};

use crate::{
    events::{ChatEvent, ToggleEvent},
    host::{Host, Participant},
    listeners,
    processor::MessageSource,
    scheduler::{Scheduler, SyncHandle, TICKS_PER_SECOND},
};

/// Posts work onto the thread that owns the [`StaffChat`].
pub type StaffChatHandle = SyncHandle<StaffChat>;

pub struct StaffChat {
    pub(crate) config: StaffChatConfig,
    pub(crate) host: Host,
    pub(crate) profiles: ProfileData,
    relay_router: RelayRouter,
    scheduler: Scheduler<StaffChat>,
    pub(crate) toggle_listeners: ListenerRegistry<ToggleEvent, StaffChat>,
    chat_listeners: ListenerRegistry<ChatEvent, StaffChat>,
}

fn flush_profiles(chat: &mut StaffChat) {
    chat.flush();
}

impl StaffChat {
    /// Load profiles, register the built-in listeners and start the flush
    /// timer. Online auto-relay users are told their chat is private again.
    pub fn new(config: StaffChatConfig, host: Host, store: Arc<dyn ProfileStore>) -> Self {
        let profiles = ProfileData::load(store, config.persist_toggles);

        let mut scheduler = Scheduler::new();
        scheduler.every(
            "flush-profiles",
            config.data.save_interval_secs.saturating_mul(TICKS_PER_SECOND),
            flush_profiles,
        );

        let mut chat = Self {
            relay_router: RelayRouter::from_config(&config),
            config,
            host,
            profiles,
            scheduler,
            toggle_listeners: ListenerRegistry::new("toggle"),
            chat_listeners: ListenerRegistry::new("chat"),
        };
        listeners::register_builtin(&mut chat);

        info!(
            profiles = chat.profiles.len(),
            persist = chat.config.persist_toggles,
            "staff chat started"
        );
        chat.notify_automatic_users(true);
        chat
    }

    /// Flush changed profiles, then tell online auto-relay users their chat
    /// is public again.
    pub fn shutdown(&mut self) {
        self.flush();
        self.notify_automatic_users(false);
        info!("staff chat stopped");
    }

    pub fn config(&self) -> &StaffChatConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn profiles(&self) -> &ProfileData {
        &self.profiles
    }

    pub fn sync_handle(&self) -> StaffChatHandle {
        self.scheduler.handle()
    }

    /// Run tasks queued before this call, then any timers that came due.
    pub fn tick(&mut self) {
        for task in self.scheduler.take_queued() {
            task(self);
        }
        for run in self.scheduler.advance() {
            run(self);
        }
    }

    /// Persist changed profiles now. Returns `true` when a write happened.
    pub fn flush(&mut self) -> bool {
        self.profiles.flush_if_dirty()
    }

    // ── Profiles ────────────────────────────────────────────────────────────

    /// Snapshot of a participant's profile, creating it if needed.
    pub fn profile_of(&mut self, id: ParticipantId) -> ChatProfile {
        self.profiles.get_or_create(id).clone()
    }

    pub fn find_profile(&self, id: ParticipantId) -> Option<&ChatProfile> {
        self.profiles.get(id)
    }

    pub fn has_access(&self, id: ParticipantId, channel: Channel) -> bool {
        self.host.permissions.has_access(id, channel)
    }

    /// Opted-out participants still receive while leaving is disabled.
    pub fn receives(&self, profile: &ChatProfile, channel: Channel) -> bool {
        profile.since_left(channel).is_none() || !self.config.leaving_enabled(channel)
    }

    /// Like [`Self::receives`]; participants without a profile receive.
    pub fn is_receiving(&self, id: ParticipantId, channel: Channel) -> bool {
        self.profiles
            .get(id)
            .is_none_or(|profile| self.receives(profile, channel))
    }

    pub fn is_automatic(&self, id: ParticipantId, channel: Channel) -> bool {
        self.profiles
            .get(id)
            .is_some_and(|profile| profile.automatic_chat(channel))
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    pub fn register_toggle_listener(&mut self, listener: Arc<dyn Listener<ToggleEvent, StaffChat>>) {
        self.toggle_listeners.register(listener);
    }

    pub fn register_chat_listener(&mut self, listener: Arc<dyn Listener<ChatEvent, StaffChat>>) {
        self.chat_listeners.register(listener);
    }

    pub fn toggle_listeners(&self) -> &ListenerRegistry<ToggleEvent, StaffChat> {
        &self.toggle_listeners
    }

    pub fn chat_listeners(&self) -> &ListenerRegistry<ChatEvent, StaffChat> {
        &self.chat_listeners
    }

    // ── Inbound ─────────────────────────────────────────────────────────────

    /// Run a local chat message through the chat listeners.
    ///
    /// Returns the (possibly rewritten) message if it should still go to
    /// public chat, or `None` if a listener intercepted it.
    pub fn handle_chat(&mut self, sender: Participant, message: &str) -> Option<String> {
        let mut event = ChatEvent::new(sender, message);
        self.chat_listeners.dispatch(self, &mut event);
        (!event.is_cancelled()).then_some(event.message)
    }

    /// Deliver a relay-side message. Returns `false` if it was ignored.
    pub fn handle_relay_message(&mut self, message: &InboundRelayMessage) -> bool {
        let Some(channel) = self.relay_router.route(message) else {
            debug!(relay_channel = %message.channel_id, "relay message not routed");
            return false;
        };
        debug!(%channel, author = %message.author.name, "relay message received");
        self.submit_message(
            channel,
            MessageSource::Relay {
                author: message.author.name.clone(),
            },
            &message.content,
        );
        true
    }

    /// Apply a new config and re-check every online participant.
    pub fn reload(&mut self, config: StaffChatConfig) {
        if config.persist_toggles != self.config.persist_toggles {
            info!("persist_toggles changes take effect on restart");
        }
        self.relay_router = RelayRouter::from_config(&config);
        self.config = config;

        let online = self.host.participants.online();
        for participant in &online {
            self.reconcile_membership(participant.id);
        }
        info!(participants = online.len(), "staff chat reloaded");
    }
}
