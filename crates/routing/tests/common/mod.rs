//! Recording host shared by the routing integration tests.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use {
    staffchat_channels::RelayTransport,
    staffchat_common::{Channel, ParticipantId},
    staffchat_config::{NotificationSound, StaffChatConfig},
    staffchat_profiles::{ProfileStore, store_memory::InMemoryStore},
    staffchat_routing::{
        Host, NotificationSink, Participant, Participants, PermissionOracle, StaffChat,
        format::strip_colors,
    },
    uuid::Uuid,
};

// ── Fake host ───────────────────────────────────────────────────────────────

/// A notice delivered to a participant, with colors stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub recipient: ParticipantId,
    pub text: String,
    pub sound: bool,
}

#[derive(Default)]
pub struct FakeHost {
    staff: Mutex<HashSet<ParticipantId>>,
    team: Mutex<HashSet<ParticipantId>>,
    online: Mutex<Vec<Participant>>,
    notices: Mutex<Vec<Notice>>,
    console: Mutex<Vec<String>>,
    resent: Mutex<Vec<(ParticipantId, String)>>,
    relayed: Mutex<Vec<(Channel, String)>>,
    relay_available: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn host(self: &Arc<Self>) -> Host {
        Host {
            permissions: Arc::clone(self) as Arc<dyn PermissionOracle>,
            participants: Arc::clone(self) as Arc<dyn Participants>,
            sink: Arc::clone(self) as Arc<dyn NotificationSink>,
            relay: Arc::clone(self) as Arc<dyn RelayTransport>,
        }
    }

    /// Bring a participant online with the given access.
    pub fn join(&self, name: &str, staff: bool, team: bool) -> Participant {
        let participant = Participant::new(Uuid::new_v4(), name);
        self.set_access(participant.id, Channel::Staff, staff);
        self.set_access(participant.id, Channel::Team, team);
        self.online.lock().unwrap().push(participant.clone());
        participant
    }

    pub fn disconnect(&self, id: ParticipantId) {
        self.online.lock().unwrap().retain(|p| p.id != id);
    }

    pub fn set_access(&self, id: ParticipantId, channel: Channel, granted: bool) {
        let set = match channel {
            Channel::Staff => &self.staff,
            Channel::Team => &self.team,
        };
        let mut set = set.lock().unwrap();
        if granted {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    pub fn set_relay_available(&self, available: bool) {
        self.relay_available.store(available, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn notices_for(&self, id: ParticipantId) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|n| n.recipient == id)
            .collect()
    }

    pub fn texts_for(&self, id: ParticipantId) -> Vec<String> {
        self.notices_for(id).into_iter().map(|n| n.text).collect()
    }

    pub fn console(&self) -> Vec<String> {
        self.console.lock().unwrap().clone()
    }

    pub fn resent(&self) -> Vec<(ParticipantId, String)> {
        self.resent.lock().unwrap().clone()
    }

    pub fn relayed(&self) -> Vec<(Channel, String)> {
        self.relayed.lock().unwrap().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
        self.console.lock().unwrap().clear();
        self.resent.lock().unwrap().clear();
        self.relayed.lock().unwrap().clear();
    }
}

impl PermissionOracle for FakeHost {
    fn has_staff_access(&self, id: ParticipantId) -> bool {
        self.staff.lock().unwrap().contains(&id)
    }

    fn has_team_access(&self, id: ParticipantId) -> bool {
        self.team.lock().unwrap().contains(&id)
    }
}

impl Participants for FakeHost {
    fn online(&self) -> Vec<Participant> {
        self.online.lock().unwrap().clone()
    }

    fn resend_chat(&self, sender: &Participant, message: &str) {
        self.resent
            .lock()
            .unwrap()
            .push((sender.id, message.to_string()));
    }
}

impl NotificationSink for FakeHost {
    fn notify(&self, recipient: &Participant, text: &str, sound: Option<&NotificationSound>) {
        self.notices.lock().unwrap().push(Notice {
            recipient: recipient.id,
            text: strip_colors(text),
            sound: sound.is_some(),
        });
    }

    fn notify_console(&self, text: &str) {
        self.console.lock().unwrap().push(strip_colors(text));
    }
}

impl RelayTransport for FakeHost {
    fn is_available(&self, _channel: Channel) -> bool {
        self.relay_available.load(Ordering::SeqCst)
    }

    fn send(&self, channel: Channel, text: &str) {
        self.relayed
            .lock()
            .unwrap()
            .push((channel, text.to_string()));
    }
}

// ── Fixture ─────────────────────────────────────────────────────────────────

pub struct Fixture {
    pub host: Arc<FakeHost>,
    pub store: Arc<InMemoryStore>,
    pub chat: StaffChat,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(StaffChatConfig::default())
    }

    pub fn with_config(config: StaffChatConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(config: StaffChatConfig, store: Arc<InMemoryStore>) -> Self {
        Self::start(FakeHost::new(), config, store)
    }

    /// Start against a host that may already have participants online.
    pub fn start(host: Arc<FakeHost>, config: StaffChatConfig, store: Arc<InMemoryStore>) -> Self {
        let chat = StaffChat::new(config, host.host(), Arc::clone(&store) as Arc<dyn ProfileStore>);
        Self { host, store, chat }
    }

    /// Run queued tasks once.
    pub fn tick(&mut self) {
        self.chat.tick();
    }
}

pub fn config_with(f: impl FnOnce(&mut StaffChatConfig)) -> StaffChatConfig {
    let mut config = StaffChatConfig::default();
    f(&mut config);
    config
}
