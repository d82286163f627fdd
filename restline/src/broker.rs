//! Event-broker contract, the published event shape, and the NATS
//! reference adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Event stream adapter used to notify other services of state changes.
///
/// Optional on the [`Service`](crate::service::Service); when absent the
/// notify stage is skipped entirely.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish `payload` under the event name
    /// (`"<resourceName>_<action>"`).
    async fn publish(&self, event: &str, payload: &Event) -> Result<()>;
}

/// The payload published for every pipeline run: a snapshot of the
/// request line and of the response the client is about to receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique id for this occurrence.
    pub id: Uuid,
    /// `"<resourceName>_<action>"`, e.g. `widget_insertOne`.
    pub name: String,
    /// When the pipeline reached the notify stage.
    pub occurred_at: DateTime<Utc>,
    /// Request-line snapshot.
    pub request: RequestInfo,
    /// Response snapshot at publish time.
    pub response: ResponseInfo,
}

/// Request line of the request that produced an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    pub uri: String,
}

/// Response snapshot carried by an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Status the pipeline had chosen when the event was published,
    /// absent when no stage had decided yet.
    pub status: Option<u16>,
    /// Wire-encoded response body, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Event {
    pub(crate) fn new(name: String, request: RequestInfo, response: ResponseInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            occurred_at: Utc::now(),
            request,
            response,
        }
    }
}

#[cfg(feature = "events")]
pub use self::nats::NatsBroker;

#[cfg(feature = "events")]
mod nats {
    use std::time::Duration;

    use async_nats::Client;

    use super::{Broker, Event};
    use crate::config::NatsConfig;
    use crate::error::{Error, Result};

    use async_trait::async_trait;

    /// Broker adapter that publishes events to NATS, using the event
    /// name as the subject.
    pub struct NatsBroker {
        client: Client,
    }

    impl NatsBroker {
        /// Connect to NATS, retrying with exponential backoff per the
        /// configuration.
        pub async fn connect(config: &NatsConfig) -> Result<Self> {
            let mut attempt = 0u32;
            let base_delay = Duration::from_secs(config.retry_delay_secs);

            loop {
                match Self::try_connect(config).await {
                    Ok(client) => {
                        if attempt > 0 {
                            tracing::info!(
                                "NATS connection established after {} attempt(s)",
                                attempt + 1
                            );
                        } else {
                            tracing::info!("NATS client connected to {}", config.url);
                        }
                        return Ok(Self { client });
                    }
                    Err(err) => {
                        attempt += 1;

                        if attempt > config.max_retries {
                            tracing::error!(
                                "failed to connect to NATS after {} attempts: {}",
                                config.max_retries + 1,
                                err
                            );
                            return Err(err);
                        }

                        let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));
                        tracing::warn!(
                            "NATS connection attempt {} failed: {}. Retrying in {:?}...",
                            attempt,
                            err,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        async fn try_connect(config: &NatsConfig) -> Result<Client> {
            let mut opts = async_nats::ConnectOptions::new();

            if let Some(name) = &config.name {
                opts = opts.name(name);
            }
            opts = opts.max_reconnects(Some(config.max_reconnects));

            let client = opts.connect(&config.url).await.map_err(|err| {
                Error::Nats(format!(
                    "failed to connect to NATS server at '{}': {}",
                    config.url, err
                ))
            })?;

            Ok(client)
        }
    }

    #[async_trait]
    impl Broker for NatsBroker {
        async fn publish(&self, event: &str, payload: &Event) -> Result<()> {
            let bytes = serde_json::to_vec(payload)
                .map_err(|err| Error::Nats(format!("failed to serialize event: {}", err)))?;

            self.client
                .publish(event.to_string(), bytes.into())
                .await
                .map_err(|err| Error::Nats(format!("failed to publish to {}: {}", event, err)))?;

            Ok(())
        }
    }
}
