//! Validator State Adapter
//!
//! Implements the `ValidatorState` port over height-addressed roster
//! snapshots. Production deployments would back this with the coordinating
//! chain's RPC; snapshots make deterministic harnesses and demos possible.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DomainId, Height, NodeId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::RegisteredValidator;
use crate::error::{AttestationError, WarpResult};
use crate::ports::outbound::ValidatorState;

/// Snapshot-backed validator state.
pub struct StaticValidatorState {
    current_height: RwLock<Height>,
    snapshots: RwLock<HashMap<(Height, DomainId), HashMap<NodeId, RegisteredValidator>>>,
}

impl StaticValidatorState {
    /// Create an empty state at height 0.
    pub fn new() -> Self {
        Self {
            current_height: RwLock::new(0),
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Builder: record a roster snapshot and move the head to `height`.
    pub fn with_snapshot(
        self,
        height: Height,
        domain: DomainId,
        roster: HashMap<NodeId, RegisteredValidator>,
    ) -> Self {
        self.insert_snapshot(height, domain, roster);
        *self.current_height.write() = height;
        self
    }

    /// Record a roster snapshot without touching the head height.
    pub fn insert_snapshot(
        &self,
        height: Height,
        domain: DomainId,
        roster: HashMap<NodeId, RegisteredValidator>,
    ) {
        self.snapshots.write().insert((height, domain), roster);
    }

    /// Move the head height.
    pub fn set_height(&self, height: Height) {
        *self.current_height.write() = height;
    }
}

impl Default for StaticValidatorState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValidatorState for StaticValidatorState {
    async fn current_height(&self, _cancel: CancellationToken) -> WarpResult<Height> {
        Ok(*self.current_height.read())
    }

    async fn validator_set(
        &self,
        _cancel: CancellationToken,
        height: Height,
        domain: DomainId,
    ) -> WarpResult<HashMap<NodeId, RegisteredValidator>> {
        match self.snapshots.read().get(&(height, domain)) {
            Some(roster) => {
                debug!(
                    "[warp] roster snapshot hit: height {}, domain {}, {} registrations",
                    height,
                    domain,
                    roster.len()
                );
                Ok(roster.clone())
            }
            None => Err(AttestationError::ValidatorState {
                reason: format!("no roster snapshot for domain {domain} at height {height}"),
            }),
        }
    }
}
