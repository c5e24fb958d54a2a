//! Membership reconciliation against a recording host.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::{Arc, Mutex};

use {
    chrono::Utc,
    common::{Fixture, config_with},
    staffchat_common::{
        Channel, ParticipantId, ToggleAxis,
        events::{Listener, ListenerOrder},
    },
    staffchat_config::StaffChatConfig,
    staffchat_profiles::{ChannelToggles, StoredProfile, store_memory::InMemoryStore},
    staffchat_routing::{StaffChat, ToggleEvent},
};

// ── Mock ────────────────────────────────────────────────────────────────────

/// Records every toggle event that reaches the monitor stage.
#[derive(Default)]
struct RecordToggles {
    events: Mutex<Vec<(ParticipantId, Channel, ToggleAxis, bool)>>,
}

impl RecordToggles {
    fn events(&self) -> Vec<(ParticipantId, Channel, ToggleAxis, bool)> {
        self.events.lock().unwrap().clone()
    }
}

impl Listener<ToggleEvent, StaffChat> for RecordToggles {
    fn name(&self) -> &str {
        "record-toggles"
    }

    fn order(&self) -> ListenerOrder {
        ListenerOrder::Monitor
    }

    fn handle(&self, _cx: &StaffChat, event: &mut ToggleEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push((
            event.profile.id(),
            event.channel,
            event.axis,
            event.enabled,
        ));
        Ok(())
    }
}

fn stored(id: ParticipantId, staff: ChannelToggles, team: ChannelToggles) -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_profiles(vec![StoredProfile {
        id: id.to_string(),
        staff,
        team,
    }]))
}

fn left_now() -> ChannelToggles {
    ChannelToggles {
        left_since: Some(Utc::now()),
        ..ChannelToggles::default()
    }
}

fn auto_now() -> ChannelToggles {
    ChannelToggles {
        auto_since: Some(Utc::now()),
        ..ChannelToggles::default()
    }
}

// ── Reconcile ───────────────────────────────────────────────────────────────

#[test]
fn members_get_a_profile_and_others_do_not() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", false, true);
    let carol = fx.host.join("Carol", false, false);

    fx.chat.reconcile_membership(alice.id);
    fx.chat.reconcile_membership(carol.id);

    assert!(fx.chat.find_profile(alice.id).is_some());
    assert!(fx.chat.find_profile(carol.id).is_none());
    assert!(fx.host.notices().is_empty());
}

#[test]
fn losing_access_turns_auto_relay_off_before_removal() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", true, false);
    let recorder = Arc::new(RecordToggles::default());
    fx.chat.register_toggle_listener(recorder.clone());

    fx.chat.set_automatic_chat(alice.id, Channel::Staff, true, true);
    fx.chat.flush();
    assert_eq!(fx.store.snapshot().len(), 1);

    fx.host.set_access(alice.id, Channel::Staff, false);
    fx.chat.reconcile_membership(alice.id);

    assert_eq!(recorder.events(), vec![
        (alice.id, Channel::Staff, ToggleAxis::AutoRelay, true),
        (alice.id, Channel::Staff, ToggleAxis::AutoRelay, false),
    ]);
    assert!(fx.chat.find_profile(alice.id).is_none());
    assert_eq!(fx.host.texts_for(alice.id), vec![
        "(Staff) → Disabled automatic staff chat".to_string()
    ]);

    assert!(fx.chat.flush());
    assert!(fx.store.snapshot().is_empty());
}

#[test]
fn reconcile_is_idempotent() {
    let id = ParticipantId::new_v4();
    let config = config_with(|c| c.team.leaving_enabled = false);
    let mut fx = Fixture::with_store(config, stored(id, auto_now(), left_now()));
    let recorder = Arc::new(RecordToggles::default());
    fx.chat.register_toggle_listener(recorder.clone());

    // Lost staff, kept team: the forced team rejoin is the only transition.
    fx.host.set_access(id, Channel::Team, true);
    fx.chat.reconcile_membership(id);
    let first = recorder.events();
    assert_eq!(first, vec![(id, Channel::Team, ToggleAxis::Receiving, true)]);

    fx.chat.reconcile_membership(id);
    assert_eq!(recorder.events(), first);

    // Lost everything: auto-relay off, then gone. Again only once.
    fx.host.set_access(id, Channel::Team, false);
    fx.chat.reconcile_membership(id);
    fx.chat.reconcile_membership(id);
    assert_eq!(recorder.events().len(), 2);
    assert!(fx.chat.find_profile(id).is_none());
}

#[test]
fn opted_out_member_losing_access_leaves_no_record() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", false, true);

    fx.chat.set_receiving(alice.id, Channel::Team, false, true);
    assert!(fx.chat.flush());
    assert_eq!(fx.store.snapshot()[0].id, alice.id.to_string());

    fx.host.set_access(alice.id, Channel::Team, false);
    fx.chat.reconcile_membership(alice.id);

    assert!(fx.chat.find_profile(alice.id).is_none());
    assert!(fx.chat.flush());
    assert!(fx.store.snapshot().is_empty());
}

#[test]
fn leaving_disabled_pulls_members_back_in() {
    let id = ParticipantId::new_v4();
    let config = config_with(|c| c.staff.leaving_enabled = false);
    let mut fx = Fixture::with_store(config, stored(id, left_now(), ChannelToggles::default()));
    let recorder = Arc::new(RecordToggles::default());
    fx.chat.register_toggle_listener(recorder.clone());
    fx.host.set_access(id, Channel::Staff, true);

    // Still delivered to while leaving is disabled, even before reconciling.
    assert!(fx.chat.is_receiving(id, Channel::Staff));

    fx.chat.reconcile_membership(id);
    assert_eq!(recorder.events(), vec![(
        id,
        Channel::Staff,
        ToggleAxis::Receiving,
        true
    )]);
    assert!(fx.chat.find_profile(id).unwrap().since_left(Channel::Staff).is_none());

    assert!(fx.chat.flush());
    assert!(fx.store.snapshot().is_empty());
}

// ── Join ────────────────────────────────────────────────────────────────────

#[test]
fn joining_participant_is_reminded_of_carried_state() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", true, true);
    fx.chat.set_automatic_chat(alice.id, Channel::Staff, true, true);
    fx.chat.set_receiving(alice.id, Channel::Team, false, true);

    fx.chat.on_participant_join(&alice);

    assert_eq!(fx.host.texts_for(alice.id), vec![
        "(Staff) → Enabled automatic staff chat".to_string(),
        "(Reminder: you left the team chat)".to_string(),
    ]);
}

#[test]
fn joining_without_access_drops_the_profile() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", true, false);
    fx.chat.set_automatic_chat(alice.id, Channel::Staff, true, true);

    fx.host.set_access(alice.id, Channel::Staff, false);
    fx.chat.on_participant_join(&alice);

    assert!(fx.chat.find_profile(alice.id).is_none());
    assert_eq!(fx.host.texts_for(alice.id), vec![
        "(Staff) → Disabled automatic staff chat".to_string()
    ]);
}

// ── Reload ──────────────────────────────────────────────────────────────────

#[test]
fn reload_reconciles_everyone_online() {
    let mut fx = Fixture::new();
    let alice = fx.host.join("Alice", true, false);
    let bob = fx.host.join("Bob", false, false);
    fx.chat.set_receiving(alice.id, Channel::Staff, false, true);
    fx.chat.profile_of(bob.id);

    let mut config = StaffChatConfig::default();
    config.staff.leaving_enabled = false;
    fx.chat.reload(config);

    assert!(!fx.chat.config().staff.leaving_enabled);
    assert!(
        fx.chat
            .find_profile(alice.id)
            .unwrap()
            .since_left(Channel::Staff)
            .is_none()
    );
    assert!(fx.chat.find_profile(bob.id).is_none());
}
