//! Resolves the caller of an operation to an [`OwnerId`].

use std::collections::HashMap;

use crate::domain::owner::OwnerId;
use crate::errors::{LedgerError, Result};

/// Maps an opaque session token to the owner it authenticates.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: Option<&str>) -> Result<OwnerId>;
}

/// Fixed token table, mainly for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentity {
    tokens: HashMap<String, OwnerId>,
}

impl StaticTokenIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
        self.tokens.insert(token.into(), owner);
        self
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn authenticate(&self, token: Option<&str>) -> Result<OwnerId> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        match token.and_then(|t| self.tokens.get(t)) {
            Some(owner) => Ok(owner.clone()),
            None => {
                tracing::warn!("rejected unauthenticated request");
                Err(LedgerError::Unauthorized)
            }
        }
    }
}

/// Single-user identity for the local CLI: every call is the configured owner.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    owner: OwnerId,
}

impl LocalIdentity {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

impl IdentityProvider for LocalIdentity {
    fn authenticate(&self, _token: Option<&str>) -> Result<OwnerId> {
        Ok(self.owner.clone())
    }
}
