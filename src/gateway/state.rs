use std::sync::Arc;

use crate::resolver::KnowledgeResolver;
use crate::store::DocumentStore;

/// Shared handler state: one resolver (and therefore one pair of caches) per process.
pub struct GatewayState<S: DocumentStore> {
    pub resolver: Arc<KnowledgeResolver<S>>,
}

impl<S: DocumentStore> GatewayState<S> {
    pub fn new(resolver: Arc<KnowledgeResolver<S>>) -> Self {
        Self { resolver }
    }
}

impl<S: DocumentStore> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}
