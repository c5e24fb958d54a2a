//! Events raised through the listener registries.

use {
    staffchat_common::{Channel, ToggleAxis, events::Cancellable},
    staffchat_profiles::ChatProfile,
};

use crate::host::Participant;

/// Raised before an auto-relay or receiving toggle is applied.
///
/// `profile` is the state before the change. Cancelling vetoes the change.
#[derive(Debug, Clone)]
pub struct ToggleEvent {
    pub profile: ChatProfile,
    pub channel: Channel,
    pub axis: ToggleAxis,
    /// The requested value of `axis`.
    pub enabled: bool,
    /// Suppress user-facing notices for this change.
    pub quiet: bool,
    cancelled: bool,
}

impl ToggleEvent {
    pub fn new(
        profile: ChatProfile,
        channel: Channel,
        axis: ToggleAxis,
        enabled: bool,
        quiet: bool,
    ) -> Self {
        Self {
            profile,
            channel,
            axis,
            enabled,
            quiet,
            cancelled: false,
        }
    }

    /// An opt-out request.
    pub fn is_leaving(&self) -> bool {
        self.axis == ToggleAxis::Receiving && !self.enabled
    }

    /// A rejoin request.
    pub fn is_joining(&self) -> bool {
        self.axis == ToggleAxis::Receiving && self.enabled
    }
}

impl Cancellable for ToggleEvent {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// A local chat message about to be broadcast publicly.
///
/// Cancelling keeps it out of public chat.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub sender: Participant,
    pub message: String,
    cancelled: bool,
}

impl ChatEvent {
    pub fn new(sender: Participant, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            cancelled: false,
        }
    }
}

impl Cancellable for ChatEvent {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}
