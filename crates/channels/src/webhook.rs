//! Fire-and-forget webhook relay.

use std::{collections::HashMap, time::Duration};

use {
    serde::Serialize,
    staffchat_common::Channel,
    staffchat_config::StaffChatConfig,
    tokio::runtime::Handle,
    tracing::{debug, warn},
};

use crate::{Error, Result, relay::RelayTransport};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// Posts channel text to per-channel webhooks.
///
/// Requests are spawned on the runtime captured at construction, so `send`
/// returns immediately and never touches the caller's thread state.
pub struct WebhookRelay {
    http: reqwest::Client,
    targets: HashMap<Channel, String>,
    username: String,
    runtime: Option<Handle>,
}

impl WebhookRelay {
    /// Build from config. Channels without a `webhook_url` are unavailable, as
    /// is every channel when the relay is disabled.
    pub fn from_config(config: &StaffChatConfig) -> Result<Self> {
        let targets = if config.relay.enabled {
            Channel::ALL
                .into_iter()
                .filter_map(|c| {
                    config
                        .channel(c)
                        .relay
                        .webhook_url
                        .clone()
                        .map(|url| (c, url))
                })
                .collect()
        } else {
            HashMap::new()
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.relay.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::external("failed to build webhook client", e))?;

        Ok(Self {
            http,
            targets,
            username: config.relay.username.clone(),
            runtime: Handle::try_current().ok(),
        })
    }

    /// Use an explicit runtime instead of the one current at construction.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn target(&self, channel: Channel) -> Option<&str> {
        self.targets.get(&channel).map(String::as_str)
    }
}

async fn post(http: reqwest::Client, url: String, username: String, text: String) -> Result<()> {
    let payload = WebhookPayload {
        content: &text,
        username: &username,
    };
    let resp = http
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| Error::external("webhook request failed", e))?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Rejected { status, body });
    }
    Ok(())
}

impl RelayTransport for WebhookRelay {
    fn is_available(&self, channel: Channel) -> bool {
        self.runtime.is_some() && self.targets.contains_key(&channel)
    }

    fn send(&self, channel: Channel, text: &str) {
        let (Some(runtime), Some(url)) = (&self.runtime, self.targets.get(&channel)) else {
            debug!(%channel, "relay unavailable, dropping message");
            return;
        };

        let fut = post(
            self.http.clone(),
            url.clone(),
            self.username.clone(),
            text.to_string(),
        );
        runtime.spawn(async move {
            match fut.await {
                Ok(()) => debug!(%channel, "relayed message"),
                Err(e) => warn!(%channel, error = %e, "failed to relay message"),
            }
        });
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
            sync::oneshot,
        },
    };

    /// Accept one HTTP request, answer `status`, and hand back its body.
    async fn one_shot_server(status: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let len = head
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if body.len() >= len {
                        break body.to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };
            let response = format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send(body);
        });

        (url, rx)
    }

    fn config(staff_url: Option<String>) -> StaffChatConfig {
        let mut cfg = StaffChatConfig::default();
        cfg.relay.enabled = true;
        cfg.staff.relay.webhook_url = staff_url;
        cfg
    }

    #[tokio::test]
    async fn only_configured_channels_are_available() {
        let relay = WebhookRelay::from_config(&config(Some("http://x/h".into()))).unwrap();
        assert!(relay.is_available(Channel::Staff));
        assert!(!relay.is_available(Channel::Team));
        assert_eq!(relay.target(Channel::Staff), Some("http://x/h"));
    }

    #[tokio::test]
    async fn disabled_relay_has_no_targets() {
        let mut cfg = config(Some("http://x/h".into()));
        cfg.relay.enabled = false;
        let relay = WebhookRelay::from_config(&cfg).unwrap();
        assert!(!relay.is_available(Channel::Staff));
    }

    #[test]
    fn without_runtime_nothing_is_available() {
        let relay = WebhookRelay::from_config(&config(Some("http://x/h".into()))).unwrap();
        assert!(!relay.is_available(Channel::Staff));
        // Must not panic.
        relay.send(Channel::Staff, "hello");
    }

    #[tokio::test]
    async fn send_posts_content_and_username() {
        let (url, body) = one_shot_server("204 No Content").await;
        let relay = WebhookRelay::from_config(&config(Some(url))).unwrap();

        relay.send(Channel::Staff, "**Alice:** hi");

        let body: serde_json::Value = serde_json::from_str(&body.await.unwrap()).unwrap();
        assert_eq!(body["content"], "**Alice:** hi");
        assert_eq!(body["username"], "Staff Chat");
    }

    #[tokio::test]
    async fn rejected_status_is_an_error() {
        let (url, _body) = one_shot_server("500 Internal Server Error").await;
        let err = post(
            reqwest::Client::new(),
            url,
            "Staff Chat".into(),
            "hi".into(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Rejected { status: 500, .. }));
    }
}
