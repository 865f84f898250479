//! Minimal named-event bus.
//!
//! Listeners subscribe to a set of [`EventName`]s and receive matching events
//! through a channel. Dropping the [`EventSubscription`] removes the listener.

use std::sync::{Arc, Weak};

use canvas3_types::CanvasId;
use parking_lot::Mutex;
use smallvec::SmallVec;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// The application is starting up; drivers should open.
    SystemOpen,
    /// The application is shutting down; drivers should close.
    SystemClose,
    /// The framebuffer of the given canvas changed size.
    CanvasResize(CanvasId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: EventName,
    /// Canvas that broadcast the event, if any.
    pub source: Option<CanvasId>,
}

impl Event {
    pub fn new(name: EventName) -> Self {
        Self { name, source: None }
    }

    pub fn canvas_resize(canvas: CanvasId) -> Self {
        Self {
            name: EventName::CanvasResize(canvas),
            source: Some(canvas),
        }
    }
}

struct Listener {
    id: usize,
    names: SmallVec<[EventName; 4]>,
    sender: flume::Sender<Event>,
}

#[derive(Default)]
struct QueueInner {
    listeners: Vec<Listener>,
    next_id: usize,
}

impl QueueInner {
    fn broadcast(&mut self, event: &Event) -> usize {
        let mut delivered = 0;
        // Listeners whose receiving side is gone are pruned here.
        self.listeners.retain(|listener| {
            if !listener.names.contains(&event.name) {
                return true;
            }
            match listener.sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }
}

/// The process wide event queue.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, names: &[EventName]) -> EventSubscription {
        let (sender, receiver) = flume::unbounded();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(Listener {
            id,
            names: names.iter().copied().collect(),
            sender,
        });

        EventSubscription {
            id,
            queue: Arc::downgrade(&self.inner),
            receiver,
        }
    }

    /// Creates a handle that can broadcast without keeping the queue alive.
    pub fn create_outlet(&self) -> EventOutlet {
        EventOutlet {
            queue: Arc::downgrade(&self.inner),
        }
    }

    /// Sends `event` to every listener subscribed to its name. Returns the
    /// number of listeners reached.
    pub fn broadcast(&self, event: Event) -> usize {
        self.inner.lock().broadcast(&event)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

/// Weak broadcasting end of an [`EventQueue`].
#[derive(Clone)]
pub struct EventOutlet {
    queue: Weak<Mutex<QueueInner>>,
}

impl EventOutlet {
    /// Broadcasts `event`; reaches nobody once the queue is gone.
    pub fn broadcast(&self, event: Event) -> usize {
        match self.queue.upgrade() {
            Some(queue) => queue.lock().broadcast(&event),
            None => 0,
        }
    }
}

/// Receiving end of a subscription.
pub struct EventSubscription {
    id: usize,
    queue: Weak<Mutex<QueueInner>>,
    receiver: flume::Receiver<Event>,
}

impl EventSubscription {
    /// Takes every event received so far.
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.lock().listeners.retain(|listener| listener.id != self.id);
        }
    }
}
