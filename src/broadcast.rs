// Fan-out of each published snapshot to every registered client

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::Snapshot;
use crate::registry::{ClientHandle, ConnectionRegistry, Frame, FrameReceiver, Registration};

/// Outcome of one publish pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub generation: u64,
    /// Handles that accepted the frame into their mailbox.
    pub delivered: usize,
    /// Handles found dead during the pass and unregistered.
    pub removed: usize,
}

#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<ConnectionRegistry>,
    latest: RwLock<Option<Frame>>,
    published_total: AtomicU64,
    removed_total: AtomicU64,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                latest: RwLock::new(None),
                published_total: AtomicU64::new(0),
                removed_total: AtomicU64::new(0),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.inner.registry
    }

    /// Serialize once and offer the frame to every client. Never waits on a client.
    pub fn publish(&self, snapshot: &Snapshot) -> Result<PublishReport, serde_json::Error> {
        let payload = serde_json::to_string(snapshot)?;
        Ok(self.publish_frame(Frame {
            generation: snapshot.generation,
            payload: Arc::from(payload),
        }))
    }

    pub fn publish_frame(&self, frame: Frame) -> PublishReport {
        *self
            .inner
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(frame.clone());

        let registry = &self.inner.registry;
        let mut delivered = 0;
        let mut removed = 0;
        registry.for_each(|handle| {
            if handle.offer(&frame) {
                delivered += 1;
            } else if registry.unregister(handle.id()) {
                removed += 1;
                tracing::debug!(
                    client_id = handle.id(),
                    peer = handle.peer(),
                    operation = "broadcast_snapshot",
                    "client gone; removed from registry"
                );
            }
        });

        self.inner.published_total.fetch_add(1, Ordering::Relaxed);
        self.inner
            .removed_total
            .fetch_add(removed as u64, Ordering::Relaxed);
        PublishReport {
            generation: frame.generation,
            delivered,
            removed,
        }
    }

    /// Register a new client, seeded with the latest frame so it can render at once.
    pub fn attach(&self, peer: impl Into<String>) -> (Registration, FrameReceiver) {
        let (handle, rx) = ClientHandle::channel(peer);
        let registration = self.inner.registry.register(handle);
        // Offered after registering: a publish racing with us can only leave a newer frame.
        if let Some(frame) = self.latest() {
            registration.handle().offer(&frame);
        }
        (registration, rx)
    }

    pub fn latest(&self) -> Option<Frame> {
        self.inner
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn client_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn published_total(&self) -> u64 {
        self.inner.published_total.load(Ordering::Relaxed)
    }

    pub fn removed_total(&self) -> u64 {
        self.inner.removed_total.load(Ordering::Relaxed)
    }
}
