//! Channel message delivery.

use {
    staffchat_common::Channel,
    tracing::debug,
};

use crate::{
    format::{colorful, strip_colors},
    host::Participant,
    service::StaffChat,
};

/// Who a channel message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSource {
    Player(Participant),
    Console,
    /// A relay-side author. Never forwarded back to the relay.
    Relay { author: String },
}

impl MessageSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Player(p) => &p.name,
            Self::Console => "CONSOLE",
            Self::Relay { author } => author,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Player(_) => "player",
            Self::Console => "console",
            Self::Relay { .. } => "relay",
        }
    }
}

impl StaffChat {
    /// Deliver `text` to `channel`: every receiving member, the console and,
    /// for player and console messages, the relay.
    ///
    /// A player who opted out still sees their own message, followed by a
    /// reminder that they left.
    pub fn submit_message(&self, channel: Channel, source: MessageSource, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            debug!(%channel, source = source.kind(), "ignoring empty message");
            return;
        }

        let messages = self.config.messages.channel(channel);
        let (format, relay_format) = match &source {
            MessageSource::Player(_) => (
                &messages.formats.player,
                Some(&messages.relay_formats.player),
            ),
            MessageSource::Console => (
                &messages.formats.console,
                Some(&messages.relay_formats.console),
            ),
            MessageSource::Relay { .. } => (&messages.formats.relay, None),
        };

        let mut placeholders = self.placeholders_for(source.name());
        placeholders.insert("message", text);
        let formatted = colorful(&placeholders.update(format));

        let recipients = self.receiving_members(channel);
        for recipient in &recipients {
            self.notify(channel, recipient, &formatted);
        }
        self.host.sink.notify_console(&formatted);

        if let MessageSource::Player(sender) = &source
            && !self.is_receiving(sender.id, channel)
        {
            self.notify(channel, sender, &formatted);
            let reminder = self.render(&messages.notifications.leave_reminder, &placeholders);
            self.host.sink.notify(sender, &reminder, None);
        }

        debug!(
            %channel,
            source = source.kind(),
            sender = source.name(),
            recipients = recipients.len(),
            "channel message delivered"
        );

        if let Some(relay_format) = relay_format
            && self.host.relay.is_available(channel)
        {
            let relayed = strip_colors(&placeholders.update(relay_format));
            self.host.relay.send(channel, &relayed);
        }
    }
}
