//! Periodic self-ping that keeps an idle instance awake

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::KeepAliveConfig;
use crate::error::Result;
use crate::shutdown::ShutdownNotifier;

/// Background task that requests the public health endpoint
pub struct KeepAlivePinger {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl KeepAlivePinger {
    /// Create a pinger for `url`
    pub fn new(url: impl Into<String>, interval: Duration, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            interval,
        })
    }

    /// Create a pinger from configuration; `None` without a hostname
    pub fn from_config(config: &KeepAliveConfig) -> Result<Option<Self>> {
        let Some(url) = config.health_url() else {
            return Ok(None);
        };
        Self::new(
            url,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one ping and return the HTTP status code
    pub async fn ping(&self) -> Result<u16> {
        let response = self.client.get(&self.url).send().await?;
        Ok(response.status().as_u16())
    }

    /// Start the ping loop; the first ping fires one interval after start
    pub fn start(self: Arc<Self>, shutdown: ShutdownNotifier) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Keep-alive started: pinging {} every {}s",
                self.url,
                self.interval.as_secs()
            );
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let stop = shutdown.wait();
            tokio::pin!(stop);

            loop {
                tokio::select! {
                    _ = &mut stop => {
                        debug!("Keep-alive stopped");
                        break;
                    }
                    _ = ticker.tick() => self.ping_and_log().await,
                }
            }
        })
    }

    /// Ping once; failures are logged and swallowed
    async fn ping_and_log(&self) {
        match self.ping().await {
            Ok(status) => info!("Keep-alive ping: {}", status),
            Err(e) => warn!("Keep-alive failed: {}", e),
        }
    }
}
