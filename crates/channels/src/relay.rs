use staffchat_common::Channel;

/// Outbound side of the remote relay.
///
/// `send` must not block and must not report failure to the caller; delivery
/// is best-effort.
pub trait RelayTransport: Send + Sync {
    /// Whether `channel` currently has somewhere to go.
    fn is_available(&self, channel: Channel) -> bool;

    fn send(&self, channel: Channel, text: &str);
}

/// Relay that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRelay;

impl RelayTransport for NoopRelay {
    fn is_available(&self, _channel: Channel) -> bool {
        false
    }

    fn send(&self, _channel: Channel, _text: &str) {}
}
