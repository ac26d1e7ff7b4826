//! # Identity Scope
//!
//! Every node owns an isolated signing context. An `IdentityScope` is the
//! exclusive hold on one node's context for the length of a single
//! "switch identity; perform call" unit.
//!
//! Scopes for different nodes never contend, so discovery can fan out
//! across peers. Scopes for the same node serialize in acquisition order.

use shared_types::SigningIdentity;
use std::fmt;
use tokio::sync::OwnedMutexGuard;

/// The signing context of one node.
#[derive(Debug, Default)]
pub struct NodeContext {
    /// Identity currently bound to the node.
    pub(crate) active: Option<SigningIdentity>,
    /// How many times an identity was bound.
    pub(crate) switches: u64,
}

impl NodeContext {
    /// Identity currently bound, if any.
    pub fn active(&self) -> Option<&SigningIdentity> {
        self.active.as_ref()
    }

    /// Number of identity switches performed on this context.
    pub fn switches(&self) -> u64 {
        self.switches
    }
}

/// Exclusive hold on a node's signing context.
///
/// Released on drop.
pub struct IdentityScope {
    node: String,
    identity: SigningIdentity,
    _guard: OwnedMutexGuard<NodeContext>,
}

impl IdentityScope {
    pub(crate) fn new(
        node: String,
        identity: SigningIdentity,
        guard: OwnedMutexGuard<NodeContext>,
    ) -> Self {
        Self {
            node,
            identity,
            _guard: guard,
        }
    }

    /// Node the scope is held for.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Identity bound for the duration of the scope.
    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }
}

impl fmt::Debug for IdentityScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityScope")
            .field("node", &self.node)
            .field("identity", &self.identity.to_string())
            .finish()
    }
}
