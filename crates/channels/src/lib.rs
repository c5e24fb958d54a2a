//! Relay side of the bridge.
//!
//! Outbound text goes through a [`RelayTransport`]; the webhook transport
//! posts fire-and-forget on the tokio runtime. Inbound relay messages are
//! mapped onto staff/team by their relay channel id.

pub mod error;
pub mod inbound;
pub mod relay;
pub mod webhook;

pub use {
    error::{Error, Result},
    inbound::{InboundRelayMessage, RelayAuthor, RelayRouter},
    relay::{NoopRelay, RelayTransport},
    webhook::WebhookRelay,
};
