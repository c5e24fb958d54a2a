use {
    anyhow::Result,
    staffchat_common::events::{Cancellable, CancellationPolicy, Listener, ListenerOrder},
    tracing::debug,
};

use crate::{events::ToggleEvent, service::StaffChat};

/// Vetoes opt-out requests on channels where leaving is disabled. Rejoining
/// is never blocked.
pub struct LeavingDisabledGate;

impl Listener<ToggleEvent, StaffChat> for LeavingDisabledGate {
    fn name(&self) -> &str {
        "leaving-disabled-gate"
    }

    fn order(&self) -> ListenerOrder {
        ListenerOrder::Early
    }

    fn cancelled_events(&self) -> CancellationPolicy {
        CancellationPolicy::Reject
    }

    fn handle(&self, cx: &StaffChat, event: &mut ToggleEvent) -> Result<()> {
        if !event.is_leaving() || cx.config().leaving_enabled(event.channel) {
            return Ok(());
        }

        event.set_cancelled(true);
        let id = event.profile.id();
        debug!(%id, channel = %event.channel, "tried to leave, but leaving is disabled");

        if event.quiet {
            return Ok(());
        }
        if let Some(actor) = cx.find_online(id) {
            let notifications = &cx.config().messages.channel(event.channel).notifications;
            cx.send_notice(event.channel, &actor, &notifications.leave_disabled, None);
        }
        Ok(())
    }
}
