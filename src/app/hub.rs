use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::{debug, trace};

/// Whether a listener took a key or left it for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFlow {
    Continue,
    Consumed,
}

pub trait KeyListener {
    fn on_key(&mut self, key: &KeyEvent) -> Result<KeyFlow>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerId(u64);

type SharedListener = Rc<RefCell<dyn KeyListener>>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(ListenerId, SharedListener)>,
}

/// Screen-wide key event source, the terminal equivalent of a document-level
/// keydown listener list.
///
/// Listeners are attached for the lifetime of a [`ListenerGuard`]; dropping
/// the guard detaches them, so repeated mount/unmount cycles never leak.
#[derive(Clone, Default)]
pub struct KeyHub {
    inner: Rc<RefCell<HubInner>>,
}

impl KeyHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, listener: SharedListener) -> ListenerGuard {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, listener));
        debug!(listener = id.0, total = inner.listeners.len(), "key listener attached");
        ListenerGuard {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Forwards a key press to listeners in attach order until one consumes
    /// it. Listener errors propagate unchanged.
    ///
    /// Listeners attached while the key is in flight see the next key, and a
    /// listener detached by an earlier one is skipped. A listener that is
    /// still handling a key when the hub dispatches again (from inside a
    /// callback) is skipped too.
    pub fn dispatch(&self, key: &KeyEvent) -> Result<KeyFlow> {
        if key.kind != KeyEventKind::Press {
            return Ok(KeyFlow::Continue);
        }
        let listeners = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect::<Vec<_>>();
        for (id, listener) in listeners {
            if !self.is_attached(id) {
                trace!(listener = id.0, "listener detached mid-dispatch; skipped");
                continue;
            }
            let Ok(mut listener) = listener.try_borrow_mut() else {
                trace!(listener = id.0, "listener busy with an outer key; skipped");
                continue;
            };
            if listener.on_key(key)? == KeyFlow::Consumed {
                trace!(code = ?key.code, "key consumed");
                return Ok(KeyFlow::Consumed);
            }
        }
        Ok(KeyFlow::Continue)
    }

    fn is_attached(&self, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .listeners
            .iter()
            .any(|(attached, _)| *attached == id)
    }
}

/// Detaches its listener from the hub when dropped.
#[must_use = "dropping the guard detaches the listener immediately"]
pub struct ListenerGuard {
    hub: Weak<RefCell<HubInner>>,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn detach(self) {}
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        // release the borrow before the listener itself is dropped
        let removed = {
            let mut inner = hub.borrow_mut();
            let index = inner.listeners.iter().position(|(id, _)| *id == self.id);
            index.map(|index| inner.listeners.remove(index))
        };
        if removed.is_some() {
            debug!(listener = self.id.0, "key listener detached");
        }
    }
}
