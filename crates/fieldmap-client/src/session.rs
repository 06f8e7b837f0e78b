//! Viewport refresh with last-move-wins semantics.
//!
//! Every refresh takes a generation token from a monotonically increasing
//! counter before it goes to the network. When the response arrives, it is
//! accepted only if no newer refresh has started in the meantime; otherwise
//! it is dropped, so a slow response for an old viewport can never replace
//! the map for the current one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fieldmap_core::{build_connection_graph, ConnectionGraph, LocationDto, LocationFilter};
use tokio::sync::RwLock;

use crate::client::MapClient;
use crate::error::ClientError;

/// Everything a renderer needs for one viewport.
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub generation: u64,
    pub filter: LocationFilter,
    pub locations: Vec<LocationDto>,
    pub graph: ConnectionGraph,
}

#[derive(Debug)]
pub struct ViewportSession {
    client: MapClient,
    generation: AtomicU64,
    latest: RwLock<Option<Arc<MapSnapshot>>>,
}

impl ViewportSession {
    #[must_use]
    pub fn new(client: MapClient) -> Self {
        Self {
            client,
            generation: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Token of the most recently started refresh; 0 before the first one.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetches locations for `filter` and rebuilds the connection graph.
    ///
    /// Returns `Ok(None)` when a newer refresh started while this one was in
    /// flight. Failures of superseded refreshes are swallowed the same way.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the current refresh fails. The previous
    /// snapshot stays in place.
    pub async fn refresh(
        &self,
        filter: LocationFilter,
    ) -> Result<Option<Arc<MapSnapshot>>, ClientError> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.client.fetch_locations(&filter).await;

        if self.is_stale(token) {
            tracing::debug!(
                generation = token,
                current = self.current_generation(),
                "discarding superseded viewport response"
            );
            return Ok(None);
        }

        let locations = result?;
        let graph = build_connection_graph(&locations);
        let snapshot = Arc::new(MapSnapshot {
            generation: token,
            filter,
            locations,
            graph,
        });

        let mut latest = self.latest.write().await;
        // Re-check under the lock: a newer refresh may have been accepted
        // while this one was building its graph.
        if self.is_stale(token) || latest.as_ref().is_some_and(|s| s.generation > token) {
            return Ok(None);
        }
        *latest = Some(Arc::clone(&snapshot));
        drop(latest);

        tracing::debug!(
            generation = token,
            locations = snapshot.locations.len(),
            edges = snapshot.graph.edges.len(),
            "viewport snapshot accepted"
        );
        Ok(Some(snapshot))
    }

    /// The most recently accepted snapshot.
    pub async fn latest(&self) -> Option<Arc<MapSnapshot>> {
        self.latest.read().await.clone()
    }

    fn is_stale(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != token
    }
}
