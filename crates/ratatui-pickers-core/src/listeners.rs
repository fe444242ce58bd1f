//! Document-level listener registration with scoped lifetimes.
//!
//! Components that react to events outside themselves (click-away, global shortcuts) subscribe
//! on mount. The returned [`Subscription`] unregisters when dropped, so unmounting, dropping the
//! component or unwinding all release the listener.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::rc::Weak;

use crate::input::KeyEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    PointerDown,
    KeyDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Events the host routes to every component subscribed to the matching [`ListenerKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentEvent {
    /// `inside` tells whether the pointer landed within the receiving component.
    PointerDown { inside: bool },
    KeyDown(KeyEvent),
}

impl DocumentEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            DocumentEvent::PointerDown { .. } => ListenerKind::PointerDown,
            DocumentEvent::KeyDown(_) => ListenerKind::KeyDown,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, ListenerKind>,
}

/// A page-wide listener registry. Cloning shares the registry.
#[derive(Clone, Debug, Default)]
pub struct Document {
    registry: Rc<RefCell<Registry>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: ListenerKind) -> Subscription {
        let mut reg = self.registry.borrow_mut();
        let id = ListenerId(reg.next_id);
        reg.next_id += 1;
        reg.listeners.insert(id, kind);
        tracing::trace!(?id, ?kind, "listener registered");
        Subscription {
            id,
            kind,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.registry
            .borrow()
            .listeners
            .values()
            .filter(|k| **k == kind)
            .count()
    }

    /// Ids currently subscribed to `kind`, in registration order.
    pub fn listeners(&self, kind: ListenerKind) -> Vec<ListenerId> {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Keeps a listener registered for as long as it is alive.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    kind: ListenerKind,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.remove(&self.id);
            tracing::trace!(id = ?self.id, "listener released");
        }
    }
}

/// The set of subscriptions a mounted component holds.
#[derive(Debug, Default)]
pub struct Mount {
    subscriptions: Vec<Subscription>,
}

impl Mount {
    pub fn new(document: &Document, kinds: &[ListenerKind]) -> Self {
        Self {
            subscriptions: kinds.iter().map(|k| document.subscribe(*k)).collect(),
        }
    }

    pub fn listens_to(&self, kind: ListenerKind) -> bool {
        self.subscriptions.iter().any(|s| s.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_subscription_unregisters() {
        let doc = Document::new();
        let a = doc.subscribe(ListenerKind::KeyDown);
        let b = doc.subscribe(ListenerKind::PointerDown);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 1);
        assert_eq!(doc.listeners(ListenerKind::PointerDown), vec![b.id()]);

        drop(a);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 0);
        drop(b);
        assert_eq!(doc.listener_count(ListenerKind::PointerDown), 0);
    }

    #[test]
    fn mount_releases_everything_on_drop() {
        let doc = Document::new();
        let mount = Mount::new(&doc, &[ListenerKind::KeyDown, ListenerKind::PointerDown]);
        assert!(mount.listens_to(ListenerKind::KeyDown));
        assert_eq!(doc.listener_count(ListenerKind::PointerDown), 1);
        drop(mount);
        assert_eq!(doc.listener_count(ListenerKind::KeyDown), 0);
        assert_eq!(doc.listener_count(ListenerKind::PointerDown), 0);
    }

    #[test]
    fn subscription_outliving_document_is_harmless() {
        let doc = Document::new();
        let sub = doc.subscribe(ListenerKind::KeyDown);
        drop(doc);
        drop(sub);
    }
}
