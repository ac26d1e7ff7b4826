//! # Event Publisher
//!
//! Subsystems announce state changes through an `Arc<dyn EventPublisher>`.
//! The runtime wires in the broadcast bus; a subsystem built on its own
//! gets [`NoopPublisher`] and announces into the void.

use crate::events::{EventFilter, GatewayEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the gateway notification channel.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`, returning how many subscriptions it reached.
    ///
    /// Filters are applied on the receiving side, so the count includes
    /// subscriptions that will skip the event.
    async fn publish(&self, event: GatewayEvent) -> usize;
}

/// Broadcast bus shared by every subsystem of one gateway.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<GatewayEvent>,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] events per subscription.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscription before it lags.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every later event that matches `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "Gateway event subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: GatewayEvent) -> usize {
        let topic = event.topic();
        let source = event.source_subsystem();

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = ?topic, source, receivers, "Gateway event published");
                receivers
            }
            Err(_) => {
                trace!(topic = ?topic, source, "Gateway event had no subscribers");
                0
            }
        }
    }
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: GatewayEvent) -> usize {
        0
    }
}
