//! Built-in listeners.

pub mod automatic;
pub mod prefixed;
pub mod toggles;

use std::sync::Arc;

use staffchat_common::Channel;

use crate::service::StaffChat;

pub(crate) fn register_builtin(chat: &mut StaffChat) {
    chat.register_chat_listener(Arc::new(prefixed::PrefixedChatListener));
    for channel in Channel::ALL {
        chat.register_chat_listener(Arc::new(automatic::AutoRelayInterceptor::new(channel)));
        chat.register_chat_listener(Arc::new(automatic::AutoRelayDispatcher::new(channel)));
    }

    chat.register_toggle_listener(Arc::new(toggles::LeavingDisabledGate));
}
