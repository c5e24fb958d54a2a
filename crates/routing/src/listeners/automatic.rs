use {
    anyhow::Result,
    staffchat_common::{
        Channel,
        events::{Cancellable, Listener, ListenerOrder},
    },
    tracing::debug,
};

use crate::{events::ChatEvent, processor::MessageSource, service::StaffChat};

/// Keeps chat from auto-relay users out of public chat early, so other
/// listeners see it as cancelled.
pub struct AutoRelayInterceptor {
    channel: Channel,
}

impl AutoRelayInterceptor {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl Listener<ChatEvent, StaffChat> for AutoRelayInterceptor {
    fn name(&self) -> &str {
        match self.channel {
            Channel::Staff => "auto-relay-intercept:staff",
            Channel::Team => "auto-relay-intercept:team",
        }
    }

    fn order(&self) -> ListenerOrder {
        ListenerOrder::First
    }

    fn handle(&self, cx: &StaffChat, event: &mut ChatEvent) -> Result<()> {
        if cx.is_automatic(event.sender.id, self.channel) {
            event.set_cancelled(true);
        }
        Ok(())
    }
}

/// Re-asserts the cancellation once every other listener has run and queues
/// the (possibly rewritten) message for the channel.
///
/// A sender who lost access since enabling auto-relay is reconciled instead,
/// and their message goes back out as public chat.
pub struct AutoRelayDispatcher {
    channel: Channel,
}

impl AutoRelayDispatcher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl Listener<ChatEvent, StaffChat> for AutoRelayDispatcher {
    fn name(&self) -> &str {
        match self.channel {
            Channel::Staff => "auto-relay-dispatch:staff",
            Channel::Team => "auto-relay-dispatch:team",
        }
    }

    fn order(&self) -> ListenerOrder {
        ListenerOrder::Monitor
    }

    fn handle(&self, cx: &StaffChat, event: &mut ChatEvent) -> Result<()> {
        let channel = self.channel;
        let sender = event.sender.clone();
        if !cx.is_automatic(sender.id, channel) {
            return Ok(());
        }

        event.set_cancelled(true);
        let message = event.message.clone();

        if cx.has_access(sender.id, channel) {
            debug!(%channel, sender = %sender.name, "auto-relay message");
            cx.sync_handle().post(move |chat| {
                chat.submit_message(channel, MessageSource::Player(sender), &message);
            });
        } else {
            debug!(
                %channel,
                sender = %sender.name,
                "auto-relay enabled without channel access, sending publicly"
            );
            cx.sync_handle().post(move |chat| {
                chat.reconcile_membership(sender.id);
                chat.host().participants.resend_chat(&sender, &message);
            });
        }
        Ok(())
    }
}
