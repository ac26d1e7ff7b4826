//! Inbound Ports (Driving Ports / API)

use crate::domain::{IdentityError, IdentityScope};
use async_trait::async_trait;
use shared_types::SigningIdentity;

/// Identity context API.
///
/// Callers take a scope, make exactly one network call with
/// `scope.identity()`, and drop the scope.
#[async_trait]
pub trait IdentityContextApi: Send + Sync {
    /// Bind the node's configured identity and return it.
    ///
    /// The context is released before this returns; use [`scope`] when the
    /// binding must hold across a call.
    ///
    /// [`scope`]: IdentityContextApi::scope
    async fn use_identity(&self, node: &str) -> Result<SigningIdentity, IdentityError>;

    /// Lock the node's context, bind its configured identity and hand back
    /// the held scope.
    async fn scope(&self, node: &str) -> Result<IdentityScope, IdentityError>;

    /// Identity most recently bound for `node`.
    fn active_identity(&self, node: &str) -> Option<SigningIdentity>;
}
