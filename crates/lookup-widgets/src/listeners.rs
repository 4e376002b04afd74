#![forbid(unsafe_code)]

//! Document-level pointer listeners for outside-click dismissal.
//!
//! Every open dropdown registers one listener with the shared
//! [`DocumentListeners`] registry and holds the returned [`ListenerGuard`].
//! The guard owns the control's hit region (trigger, listbox, card) and
//! answers "is this point outside me?" for that control only, so two open
//! controls never react to each other's regions. Dropping the guard
//! deregisters it; [`DocumentListeners::active_count`] exposes leaks.
//!
//! The registry is single-threaded (`Rc<RefCell<..>>`), like the event loop
//! that drives the controls.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use lookup_core::geometry::Rect;

/// Identifier of a registered listener.
pub type ListenerId = u64;

#[derive(Debug, Default)]
struct Registry {
    next_id: ListenerId,
    listeners: BTreeMap<ListenerId, Listener>,
}

#[derive(Debug)]
struct Listener {
    owner: String,
    region: Vec<Rect>,
}

/// Shared registry of active outside-click listeners.
///
/// Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct DocumentListeners {
    inner: Rc<RefCell<Registry>>,
}

impl DocumentListeners {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `owner`. It stays active until the guard drops.
    pub fn register(&self, owner: &str) -> ListenerGuard {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.insert(
            id,
            Listener {
                owner: owner.to_owned(),
                region: Vec::new(),
            },
        );
        lookup_core::trace!(id, owner, "document listener registered");
        ListenerGuard {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Owners of the registered listeners, in registration order.
    pub fn owners(&self) -> Vec<String> {
        self.inner
            .borrow()
            .listeners
            .values()
            .map(|l| l.owner.clone())
            .collect()
    }
}

fn region_contains(region: &[Rect], x: u16, y: u16) -> bool {
    region.iter().any(|r| r.contains(x, y))
}

/// Registration handle for one open dropdown. Deregisters on drop.
#[derive(Debug)]
pub struct ListenerGuard {
    id: ListenerId,
    registry: Weak<RefCell<Registry>>,
}

impl ListenerGuard {
    /// Replace the hit region (trigger, listbox, card).
    pub fn set_region(&self, region: &[Rect]) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.borrow_mut();
        if let Some(listener) = registry.listeners.get_mut(&self.id) {
            listener.region.clear();
            listener
                .region
                .extend(region.iter().copied().filter(|r| !r.is_empty()));
        }
    }

    /// Whether `(x, y)` lies inside this listener's region.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            registry
                .borrow()
                .listeners
                .get(&self.id)
                .is_some_and(|l| region_contains(&l.region, x, y))
        })
    }

    /// Whether a press at `(x, y)` should dismiss this listener's dropdown.
    #[inline]
    pub fn is_outside(&self, x: u16, y: u16) -> bool {
        !self.contains(x, y)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.remove(&self.id);
            lookup_core::trace!(id = self.id, "document listener released");
        }
    }
}
