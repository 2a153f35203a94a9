//! Remote collaboration boundary.
//!
//! The transport (a WebSocket client, a test harness, ...) owns a [`SyncEndpoint`] and
//! the engine owns the matching [`RemoteSyncAdapter`]. Inbound frames are queued by the
//! transport and drained by the engine on its own thread; nothing here blocks.
//!
//! Every inbound change is applied with [`ChangeOrigin::Remote`], so it never enters undo
//! history and never touches the dirty flag. Concurrent edits to the same field resolve
//! last-writer-wins in queue order.
use crate::config::EngineConfig;
use crate::document::{DocumentStore, RemoteCursor};
use crate::error::{NodeDataError, SyncError};
use crate::patch::{ChangeOrigin, ChangeSet, NodeChange};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

/// A collaboration message, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    NodesChanged {
        changes: Vec<NodeChange>,
    },
    DataUpdated {
        #[serde(rename = "nodeId")]
        node_id: String,
        data: Map<String, Value>,
    },
    CursorUpdate {
        cursor: RemoteCursor,
    },
    /// Sent by the collaboration server when a peer disconnects.
    CursorLeave {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

impl SyncMessage {
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A message addressed to one open document.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEvent {
    pub path: String,
    pub message: SyncMessage,
}

/// Outcome of one [`RemoteSyncAdapter::drain`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: usize,
    /// Messages whose data failed schema validation.
    pub rejected: usize,
    /// Messages for documents that are not open.
    pub ignored: usize,
}

/// Applies a single remote message to `path`.
///
/// Unknown paths and node ids are ignored by the store. Only schema violations in a
/// `data_updated` payload are reported.
pub fn apply_remote(
    store: &mut DocumentStore,
    path: &str,
    message: SyncMessage,
) -> Result<(), NodeDataError> {
    match message {
        SyncMessage::NodesChanged { changes } => {
            store.apply_node_changes(path, ChangeSet::remote(changes));
        }
        SyncMessage::DataUpdated { node_id, data } => {
            store.update_node_data(path, &node_id, &data, ChangeOrigin::Remote)?;
        }
        SyncMessage::CursorUpdate { cursor } => store.update_remote_cursor(path, cursor),
        SyncMessage::CursorLeave { user_id } => store.remove_remote_cursor(path, &user_id),
    }
    Ok(())
}

/// Engine side of the sync channel pair.
#[derive(Debug)]
pub struct RemoteSyncAdapter {
    inbound: mpsc::Receiver<SyncEvent>,
    outbound: mpsc::Sender<SyncEvent>,
    capacity: usize,
}

/// Transport side of the sync channel pair.
#[derive(Debug)]
pub struct SyncEndpoint {
    inbound: mpsc::Sender<SyncEvent>,
    outbound: mpsc::Receiver<SyncEvent>,
    capacity: usize,
}

impl RemoteSyncAdapter {
    /// Creates a connected adapter/endpoint pair with `capacity` slots in each direction.
    ///
    /// `capacity` must be non-zero; [`EngineConfig`] enforces this when loaded from a file.
    pub fn channel(capacity: usize) -> (Self, SyncEndpoint) {
        let capacity = capacity.max(1);
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let adapter = Self {
            inbound: inbound_rx,
            outbound: outbound_tx,
            capacity,
        };
        let endpoint = SyncEndpoint {
            inbound: inbound_tx,
            outbound: outbound_rx,
            capacity,
        };
        (adapter, endpoint)
    }

    pub fn with_config(config: &EngineConfig) -> (Self, SyncEndpoint) {
        Self::channel(config.sync_queue_capacity)
    }

    /// Applies every queued inbound message, in arrival order.
    pub fn drain(&mut self, store: &mut DocumentStore) -> DrainReport {
        let mut report = DrainReport::default();
        loop {
            let event = match self.inbound.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("sync endpoint dropped; inbound queue closed");
                    break;
                }
            };

            if !store.contains(&event.path) {
                debug!(path = %event.path, "ignoring sync message for unopened document");
                report.ignored += 1;
                continue;
            }
            match apply_remote(store, &event.path, event.message) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!(path = %event.path, error = %e, "rejected remote data update");
                    report.rejected += 1;
                }
            }
        }
        report
    }

    /// Queues a message for the transport to send.
    pub fn publish(&self, path: &str, message: SyncMessage) -> Result<(), SyncError> {
        send(&self.outbound, path, message, self.capacity)
    }

    /// Forwards a local change-set to collaborators. Remote change-sets are not echoed back.
    pub fn publish_node_changes(
        &self,
        path: &str,
        changes: &ChangeSet<NodeChange>,
    ) -> Result<(), SyncError> {
        if changes.is_remote() || changes.changes.is_empty() {
            return Ok(());
        }
        self.publish(
            path,
            SyncMessage::NodesChanged {
                changes: changes.changes.clone(),
            },
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl SyncEndpoint {
    /// Queues an inbound message for the engine.
    pub fn push(&self, path: &str, message: SyncMessage) -> Result<(), SyncError> {
        send(&self.inbound, path, message, self.capacity)
    }

    /// Decodes a raw JSON frame and queues it. Undecodable frames are not queued.
    pub fn push_raw(&self, path: &str, frame: &str) -> Result<(), SyncError> {
        let message = SyncMessage::from_json(frame)?;
        self.push(path, message)
    }

    /// Takes the next outbound message, if one is queued.
    pub fn try_next_outbound(&mut self) -> Option<SyncEvent> {
        self.outbound.try_recv().ok()
    }

    /// Waits for the next outbound message. `None` once the adapter is dropped.
    pub async fn next_outbound(&mut self) -> Option<SyncEvent> {
        self.outbound.recv().await
    }
}

fn send(
    tx: &mpsc::Sender<SyncEvent>,
    path: &str,
    message: SyncMessage,
    capacity: usize,
) -> Result<(), SyncError> {
    let event = SyncEvent {
        path: path.to_string(),
        message,
    };
    tx.try_send(event).map_err(|e| match e {
        TrySendError::Full(event) => SyncError::QueueFull {
            path: event.path,
            capacity,
        },
        TrySendError::Closed(_) => SyncError::Disconnected,
    })
}
