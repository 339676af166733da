// Live client connections, shared by the WebSocket handlers and the broadcaster.
// Each handle owns a single-slot "freshest wins" mailbox: a newer frame replaces
// an unread older one, so a slow client never builds a backlog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

pub type ClientId = u64;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// One serialized snapshot, shared by every client it is delivered to.
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: u64,
    pub payload: Arc<str>,
}

/// Receiving end of a client's mailbox; held by that client's connection task.
pub type FrameReceiver = watch::Receiver<Option<Frame>>;

#[derive(Debug)]
pub struct ClientHandle {
    id: ClientId,
    peer: String,
    alive: AtomicBool,
    slot: watch::Sender<Option<Frame>>,
}

impl ClientHandle {
    /// New handle with an empty mailbox, plus the receiver the connection task drains.
    pub fn channel(peer: impl Into<String>) -> (Self, FrameReceiver) {
        let (slot, rx) = watch::channel(None);
        let handle = Self {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            peer: peer.into(),
            alive: AtomicBool::new(true),
            slot,
        };
        (handle, rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Place `frame` in the mailbox without waiting. Frames not newer than the
    /// one already held are ignored. Returns false once the receiver is gone.
    pub fn offer(&self, frame: &Frame) -> bool {
        if !self.is_alive() || self.slot.is_closed() {
            self.mark_dead();
            return false;
        }
        self.slot.send_if_modified(|current| match current {
            Some(held) if held.generation >= frame.generation => false,
            _ => {
                *current = Some(frame.clone());
                true
            }
        });
        true
    }

    /// Generation currently waiting in (or last taken from) the mailbox.
    pub fn pending_generation(&self) -> Option<u64> {
        self.slot.borrow().as_ref().map(|f| f.generation)
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: RwLock<HashMap<ClientId, Arc<ClientHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle; the returned guard unregisters it when dropped.
    pub fn register(self: &Arc<Self>, handle: ClientHandle) -> Registration {
        let handle = Arc::new(handle);
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.id(), handle.clone());
        tracing::debug!(client_id = handle.id(), peer = handle.peer(), "client registered");
        Registration {
            registry: self.clone(),
            handle,
        }
    }

    /// Remove a handle and mark it dead. Returns false if it was already gone.
    pub fn unregister(&self, id: ClientId) -> bool {
        let removed = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(handle) => {
                handle.mark_dead();
                tracing::debug!(client_id = id, peer = handle.peer(), "client unregistered");
                true
            }
            None => false,
        }
    }

    /// Copy of the current membership, taken under a short read lock.
    pub fn handles(&self) -> Vec<Arc<ClientHandle>> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Visit every member of a stable copy; `f` may register or unregister freely.
    pub fn for_each(&self, mut f: impl FnMut(&Arc<ClientHandle>)) {
        for handle in self.handles() {
            f(&handle);
        }
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Membership guard for one connection (register = create, drop = unregister).
#[derive(Debug)]
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    handle: Arc<ClientHandle>,
}

impl Registration {
    pub fn id(&self) -> ClientId {
        self.handle.id()
    }

    pub fn handle(&self) -> &Arc<ClientHandle> {
        &self.handle
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.handle.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(generation: u64) -> Frame {
        Frame {
            generation,
            payload: Arc::from(format!("{{\"generation\":{generation}}}")),
        }
    }

    #[test]
    fn offer_keeps_only_newest_frame() {
        let (handle, mut rx) = ClientHandle::channel("test");
        assert!(handle.offer(&frame(1)));
        assert!(handle.offer(&frame(2)));
        assert!(handle.offer(&frame(3)));
        let got = rx.borrow_and_update().clone().unwrap();
        assert_eq!(got.generation, 3);
    }

    #[test]
    fn offer_ignores_older_generation() {
        let (handle, rx) = ClientHandle::channel("test");
        handle.offer(&frame(5));
        handle.offer(&frame(4));
        assert_eq!(rx.borrow().as_ref().unwrap().generation, 5);
    }

    #[test]
    fn offer_fails_after_receiver_dropped() {
        let (handle, rx) = ClientHandle::channel("test");
        drop(rx);
        assert!(!handle.offer(&frame(1)));
        assert!(!handle.is_alive());
    }

    #[test]
    fn registration_drop_unregisters() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (handle, _rx) = ClientHandle::channel("test");
        let reg = registry.register(handle);
        let id = reg.id();
        assert!(registry.contains(id));
        drop(reg);
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_twice_is_harmless() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (handle, _rx) = ClientHandle::channel("test");
        let reg = registry.register(handle);
        assert!(registry.unregister(reg.id()));
        assert!(!registry.unregister(reg.id()));
        assert!(!reg.handle().is_alive());
    }
}
