//! # Event Subscription
//!
//! Receiving side of the bus. Each subscription filters on receive and
//! sees only events published after it was opened.

use crate::events::{EventFilter, GatewayEvent};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

/// Failure to read from a subscription.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every publisher is gone.
    #[error("gateway event bus closed")]
    Closed,
}

/// Handle on the gateway notification channel. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<GatewayEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<GatewayEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next matching event, or `None` once the bus is dropped.
    ///
    /// A subscription that falls more than the bus capacity behind loses
    /// the oldest events and carries on with the rest.
    pub async fn recv(&mut self) -> Option<GatewayEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Gateway event subscription lagged");
                }
            }
        }
    }

    /// Next matching event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<GatewayEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Gateway event subscription lagged");
                }
            }
        }
    }

    /// Every matching event currently buffered, in publish order.
    pub fn drain(&mut self) -> Vec<GatewayEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;
    use crate::publisher::InMemoryEventBus;
    use crate::EventPublisher;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_recv_skips_other_topics() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Topology]));

        bus.publish(GatewayEvent::RegistryLoaded { nodes: 1 }).await;
        bus.publish(GatewayEvent::TopologyDiscovered {
            version: 7,
            channels: vec!["mychannel".into()],
            peers_denied: vec![],
        })
        .await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(received, GatewayEvent::TopologyDiscovered { version: 7, .. }));
    }

    #[tokio::test]
    async fn test_events_before_subscribing_are_not_seen() {
        let bus = InMemoryEventBus::new();
        let _keep_open = bus.subscribe(EventFilter::all());
        bus.publish(GatewayEvent::RegistryLoaded { nodes: 1 }).await;

        let mut late = bus.subscribe(EventFilter::all());
        assert!(matches!(late.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_lagging_subscription_keeps_newest_events() {
        let bus = InMemoryEventBus::with_capacity(2);
        let mut sub = bus.subscribe(EventFilter::all());

        for nodes in 1..=4 {
            bus.publish(GatewayEvent::RegistryLoaded { nodes }).await;
        }

        let events = sub.drain();
        assert!(matches!(
            events.as_slice(),
            [GatewayEvent::RegistryLoaded { nodes: 3 }, GatewayEvent::RegistryLoaded { nodes: 4 }]
        ));
    }

    #[tokio::test]
    async fn test_recv_ends_when_bus_is_dropped() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        drop(bus);

        assert!(sub.recv().await.is_none());
        assert!(matches!(sub.try_recv(), Err(SubscriptionError::Closed)));
    }

    #[tokio::test]
    async fn test_drain_returns_buffered_events_in_order() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(GatewayEvent::GatewayBusy {
            busy: true,
            reason: "connect".into(),
        })
        .await;
        bus.publish(GatewayEvent::Disconnected).await;

        let events = sub.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GatewayEvent::GatewayBusy { busy: true, .. }));
        assert!(matches!(events[1], GatewayEvent::Disconnected));
    }
}
