//! # Event Subscription
//!
//! One commit-event feed per channel × peer, shared by every transaction
//! that waits on that peer.
//!
//! ```text
//! register(tx) ──► listeners[tx] = oneshot
//!                  feed not open? ──► open_commit_feed ──► spawn dispatcher
//!
//! dispatcher:  Ok(event)  ──► listeners.remove(event.tx_id) ──► VALID ? Ok : Invalid
//!              Err(e)     ──► fail every pending listener with Transport(e)
//!              feed ends  ──► fail every pending listener with Transport(Closed)
//!
//! unregister / disconnect / drop ──► pending listeners resolve Cancelled
//! ```
//!
//! Events for transaction IDs nobody is waiting on are dropped.

use super::errors::EventError;
use parking_lot::Mutex;
use shared_types::{
    CommitEvent, CommitEventFeed, PeerClient, SigningIdentity, TransactionId, TransportError,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Outcome = Result<CommitEvent, EventError>;

#[derive(Default)]
struct SubscriptionState {
    listeners: HashMap<TransactionId, oneshot::Sender<Outcome>>,
    connected: bool,
    disconnected: bool,
    dispatcher: Option<JoinHandle<()>>,
}

impl SubscriptionState {
    fn cancel_all(&mut self) -> usize {
        let pending = self.listeners.len();
        for (tx_id, sender) in self.listeners.drain() {
            let _ = sender.send(Err(EventError::Cancelled { tx_id }));
        }
        pending
    }

    fn fail_all(&mut self, peer: &str, channel: &str, source: &TransportError) {
        for (_, sender) in self.listeners.drain() {
            let _ = sender.send(Err(EventError::Transport {
                peer: peer.to_string(),
                channel: channel.to_string(),
                source: source.clone(),
            }));
        }
    }
}

/// Commit-event subscription on one peer for one channel.
pub struct EventSubscription {
    channel: String,
    peer: String,
    client: Arc<dyn PeerClient>,
    state: Arc<Mutex<SubscriptionState>>,
    connect: tokio::sync::Mutex<()>,
}

impl EventSubscription {
    /// Create an unconnected subscription. The feed opens on first use.
    pub fn new(channel: impl Into<String>, peer: impl Into<String>, client: Arc<dyn PeerClient>) -> Self {
        Self {
            channel: channel.into(),
            peer: peer.into(),
            client,
            state: Arc::new(Mutex::new(SubscriptionState::default())),
            connect: tokio::sync::Mutex::new(()),
        }
    }

    /// Channel of the subscription.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Peer serving the subscription.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Whether the feed is currently open.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Number of transactions waiting on this subscription.
    pub fn pending(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Register a one-shot listener for `tx_id`, opening the feed with
    /// `signer` if it is not open yet.
    ///
    /// Must be called before the transaction is broadcast; events that
    /// arrive before registration are never replayed.
    pub async fn register(
        &self,
        signer: &SigningIdentity,
        tx_id: &TransactionId,
    ) -> Result<CommitListener, EventError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock();
            if state.disconnected {
                return Err(self.disconnected_error());
            }
            state.listeners.insert(tx_id.clone(), sender);
        }

        let listener = CommitListener {
            tx_id: tx_id.clone(),
            receiver,
            state: Arc::downgrade(&self.state),
        };

        // Dropping `listener` on error removes the entry registered above.
        self.ensure_connected(signer).await?;

        debug!(
            peer = %self.peer,
            channel = %self.channel,
            tx_id = %tx_id,
            "Commit listener registered"
        );
        Ok(listener)
    }

    /// Resolve the listener for `tx_id` with a cancellation failure.
    pub fn unregister(&self, tx_id: &TransactionId) -> bool {
        let sender = self.state.lock().listeners.remove(tx_id);
        match sender {
            Some(sender) => {
                let _ = sender.send(Err(EventError::Cancelled {
                    tx_id: tx_id.clone(),
                }));
                debug!(peer = %self.peer, channel = %self.channel, tx_id = %tx_id, "Commit listener unregistered");
                true
            }
            None => false,
        }
    }

    /// Close the feed and cancel every pending listener. Further
    /// registrations fail.
    pub fn disconnect(&self) {
        let cancelled = {
            let mut state = self.state.lock();
            state.disconnected = true;
            state.connected = false;
            if let Some(dispatcher) = state.dispatcher.take() {
                dispatcher.abort();
            }
            state.cancel_all()
        };
        debug!(
            peer = %self.peer,
            channel = %self.channel,
            cancelled,
            "Event subscription disconnected"
        );
    }

    async fn ensure_connected(&self, signer: &SigningIdentity) -> Result<(), EventError> {
        let _connecting = self.connect.lock().await;
        if self.state.lock().connected {
            return Ok(());
        }

        let feed = self
            .client
            .open_commit_feed(signer, &self.channel)
            .await
            .map_err(|source| EventError::Transport {
                peer: self.peer.clone(),
                channel: self.channel.clone(),
                source,
            })?;

        let mut state = self.state.lock();
        if state.disconnected {
            return Err(self.disconnected_error());
        }
        state.connected = true;
        state.dispatcher = Some(tokio::spawn(dispatch(
            feed,
            Arc::clone(&self.state),
            self.peer.clone(),
            self.channel.clone(),
        )));
        debug!(peer = %self.peer, channel = %self.channel, "Commit event feed connected");
        Ok(())
    }

    fn disconnected_error(&self) -> EventError {
        EventError::Disconnected {
            peer: self.peer.clone(),
            channel: self.channel.clone(),
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(dispatcher) = state.dispatcher.take() {
            dispatcher.abort();
        }
        state.cancel_all();
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("channel", &self.channel)
            .field("peer", &self.peer)
            .field("connected", &self.is_connected())
            .finish()
    }
}

async fn dispatch(
    mut feed: CommitEventFeed,
    state: Arc<Mutex<SubscriptionState>>,
    peer: String,
    channel: String,
) {
    while let Some(item) = feed.recv().await {
        match item {
            Ok(event) => {
                let sender = state.lock().listeners.remove(&event.tx_id);
                let Some(sender) = sender else {
                    debug!(peer = %peer, channel = %channel, tx_id = %event.tx_id, "Commit event for unknown transaction ignored");
                    continue;
                };
                let outcome = if event.is_valid() {
                    Ok(event)
                } else {
                    Err(EventError::Invalid {
                        tx_id: event.tx_id,
                        validation_code: event.validation_code,
                        block_number: event.block_number,
                    })
                };
                let _ = sender.send(outcome);
            }
            Err(source) => {
                warn!(peer = %peer, channel = %channel, error = %source, "Commit event feed failed");
                let mut state = state.lock();
                state.connected = false;
                state.fail_all(&peer, &channel, &source);
                return;
            }
        }
    }

    let mut state = state.lock();
    state.connected = false;
    if !state.disconnected {
        state.fail_all(
            &peer,
            &channel,
            &TransportError::Closed("commit event feed ended".to_string()),
        );
    }
}

/// A one-shot wait for one transaction's commit event.
///
/// Dropping the listener unregisters it.
pub struct CommitListener {
    tx_id: TransactionId,
    receiver: oneshot::Receiver<Outcome>,
    state: Weak<Mutex<SubscriptionState>>,
}

impl CommitListener {
    /// Transaction the listener waits for.
    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    /// Wait for the commit event.
    ///
    /// Succeeds only when the event carries the `VALID` code.
    pub async fn wait(&mut self) -> Result<CommitEvent, EventError> {
        match (&mut self.receiver).await {
            Ok(outcome) => outcome,
            Err(_) => Err(EventError::Cancelled {
                tx_id: self.tx_id.clone(),
            }),
        }
    }
}

impl Drop for CommitListener {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.lock().listeners.remove(&self.tx_id);
        }
    }
}

impl fmt::Debug for CommitListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitListener")
            .field("tx_id", &self.tx_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_simnet::SimulatedNetwork;
    use shared_types::{Identity, Node, NodeClient, NodeClientFactory};
    use std::time::Duration;

    fn signer() -> SigningIdentity {
        SigningIdentity::new(Identity::new("admin", "cert", "key", "Org1MSP"))
    }

    fn subscription(network: &SimulatedNetwork) -> EventSubscription {
        network.join_channel("peer0", "mychannel");
        let node = Node::peer("peer0", "grpc://localhost:7051", "w", "admin");
        let NodeClient::Peer(client) = network.connect(&node).unwrap() else {
            panic!("expected a peer client");
        };
        EventSubscription::new("mychannel", "peer0", client)
    }

    async fn wait(listener: &mut CommitListener) -> Result<CommitEvent, EventError> {
        tokio::time::timeout(Duration::from_secs(1), listener.wait())
            .await
            .expect("listener did not resolve")
    }

    #[tokio::test]
    async fn test_valid_event_resolves_listener() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        assert!(sub.is_connected());

        network.emit_commit_event("mychannel", &tx_id, "VALID");
        let event = wait(&mut listener).await.unwrap();
        assert_eq!(event.tx_id, tx_id);
        assert_eq!(sub.pending(), 0);
    }

    #[tokio::test]
    async fn test_invalid_code_rejects_listener() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        network.emit_commit_event("mychannel", &tx_id, "ENDORSEMENT_POLICY_FAILURE");

        let err = wait(&mut listener).await.unwrap_err();
        assert!(matches!(err, EventError::Invalid { validation_code, .. } if validation_code == "ENDORSEMENT_POLICY_FAILURE"));
    }

    #[tokio::test]
    async fn test_events_route_by_transaction_id() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let a = TransactionId::from_string("a");
        let b = TransactionId::from_string("b");

        let mut la = sub.register(&signer(), &a).await.unwrap();
        let mut lb = sub.register(&signer(), &b).await.unwrap();

        network.emit_commit_event("mychannel", &TransactionId::from_string("stale"), "VALID");
        network.emit_commit_event("mychannel", &b, "VALID");
        network.emit_commit_event("mychannel", &a, "MVCC_READ_CONFLICT");

        assert!(wait(&mut lb).await.is_ok());
        assert!(wait(&mut la).await.is_err());
    }

    #[tokio::test]
    async fn test_unregister_cancels_pending_wait() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        assert!(sub.unregister(&tx_id));
        assert!(!sub.unregister(&tx_id));

        let err = wait(&mut listener).await.unwrap_err();
        assert_eq!(err, EventError::Cancelled { tx_id });
    }

    #[tokio::test]
    async fn test_disconnect_cancels_and_refuses_new_listeners() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        sub.disconnect();

        assert!(matches!(wait(&mut listener).await, Err(EventError::Cancelled { .. })));
        assert!(matches!(
            sub.register(&signer(), &tx_id).await,
            Err(EventError::Disconnected { .. })
        ));
    }

    #[tokio::test]
    async fn test_feed_failure_fails_pending_listeners() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        network.fail_event_feed("peer0", TransportError::Unavailable("peer went away".into()));

        let err = wait(&mut listener).await.unwrap_err();
        assert!(matches!(err, EventError::Transport { peer, .. } if peer == "peer0"));
    }

    #[tokio::test]
    async fn test_dropping_listener_unregisters_it() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);

        let listener = sub
            .register(&signer(), &TransactionId::from_string("tx1"))
            .await
            .unwrap();
        assert_eq!(sub.pending(), 1);
        drop(listener);
        assert_eq!(sub.pending(), 0);
    }

    #[tokio::test]
    async fn test_dropping_subscription_closes_feed() {
        let network = SimulatedNetwork::new();
        let sub = subscription(&network);
        let tx_id = TransactionId::from_string("tx1");

        let mut listener = sub.register(&signer(), &tx_id).await.unwrap();
        assert_eq!(network.open_feeds(), 1);
        drop(sub);

        assert!(matches!(wait(&mut listener).await, Err(EventError::Cancelled { .. })));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(network.open_feeds(), 0);
    }
}
