//! Inbound relay messages.

use std::collections::HashMap;

use {
    serde::{Deserialize, Serialize},
    staffchat_common::Channel,
    staffchat_config::StaffChatConfig,
    tracing::debug,
};

/// Author of a relay-side message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayAuthor {
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// A message posted on the relay side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRelayMessage {
    pub channel_id: String,
    pub author: RelayAuthor,
    pub content: String,
}

/// Maps relay channel ids onto staff/team.
#[derive(Debug, Clone, Default)]
pub struct RelayRouter {
    routes: HashMap<String, Channel>,
}

impl RelayRouter {
    pub fn from_config(config: &StaffChatConfig) -> Self {
        let mut routes = HashMap::new();
        // Staff first so it keeps an id both channels claim.
        for channel in Channel::ALL {
            if let Some(id) = &config.channel(channel).relay.channel_id {
                routes.entry(id.clone()).or_insert(channel);
            }
        }
        Self { routes }
    }

    /// The channel `message` belongs to, or `None` when it should be ignored:
    /// bot authors, unknown relay channels and blank content.
    pub fn route(&self, message: &InboundRelayMessage) -> Option<Channel> {
        if message.author.is_bot {
            debug!(author = %message.author.name, "ignoring relay message from bot");
            return None;
        }
        if message.content.trim().is_empty() {
            return None;
        }
        self.routes.get(&message.channel_id).copied()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn message(channel_id: &str, is_bot: bool, content: &str) -> InboundRelayMessage {
        InboundRelayMessage {
            channel_id: channel_id.into(),
            author: RelayAuthor {
                name: "Alice".into(),
                is_bot,
            },
            content: content.into(),
        }
    }

    fn router() -> RelayRouter {
        let mut cfg = StaffChatConfig::default();
        cfg.staff.relay.channel_id = Some("100".into());
        cfg.team.relay.channel_id = Some("200".into());
        RelayRouter::from_config(&cfg)
    }

    #[test]
    fn routes_by_channel_id() {
        let router = router();
        assert_eq!(router.route(&message("100", false, "hi")), Some(Channel::Staff));
        assert_eq!(router.route(&message("200", false, "hi")), Some(Channel::Team));
        assert_eq!(router.route(&message("300", false, "hi")), None);
    }

    #[test]
    fn ignores_bots_and_blank_messages() {
        let router = router();
        assert_eq!(router.route(&message("100", true, "hi")), None);
        assert_eq!(router.route(&message("100", false, "   ")), None);
    }

    #[test]
    fn shared_id_goes_to_staff() {
        let mut cfg = StaffChatConfig::default();
        cfg.staff.relay.channel_id = Some("1".into());
        cfg.team.relay.channel_id = Some("1".into());
        let router = RelayRouter::from_config(&cfg);
        assert_eq!(router.route(&message("1", false, "x")), Some(Channel::Staff));
    }

    #[test]
    fn deserializes_without_bot_flag() {
        let msg: InboundRelayMessage = serde_json::from_str(
            r#"{"channel_id":"100","author":{"name":"Bob"},"content":"hey"}"#,
        )
        .unwrap();
        assert!(!msg.author.is_bot);
    }
}
