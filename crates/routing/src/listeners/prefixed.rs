use {
    anyhow::Result,
    staffchat_common::{
        Channel,
        events::{Cancellable, Listener, ListenerOrder},
    },
    tracing::debug,
};

use crate::{events::ChatEvent, processor::MessageSource, service::StaffChat};

/// Redirects messages that start with a channel's identifier into that
/// channel. Staff and team are checked independently, so a message can match
/// both.
pub struct PrefixedChatListener;

impl Listener<ChatEvent, StaffChat> for PrefixedChatListener {
    fn name(&self) -> &str {
        "prefixed-chat"
    }

    fn order(&self) -> ListenerOrder {
        ListenerOrder::Early
    }

    fn handle(&self, cx: &StaffChat, event: &mut ChatEvent) -> Result<()> {
        for channel in Channel::ALL {
            let prefixed = &cx.config().channel(channel).prefixed_chat;
            if !prefixed.enabled || prefixed.identifier.is_empty() {
                continue;
            }
            let Some(rest) = event.message.strip_prefix(prefixed.identifier.as_str()) else {
                continue;
            };
            if !cx.has_access(event.sender.id, channel) {
                continue;
            }

            let content = rest.trim().to_string();
            debug!(
                %channel,
                sender = %event.sender.name,
                content = %content,
                "prefixed channel message"
            );
            event.set_cancelled(true);

            let sender = event.sender.clone();
            cx.sync_handle().post(move |chat| {
                chat.submit_message(channel, MessageSource::Player(sender), &content);
            });
        }
        Ok(())
    }
}
