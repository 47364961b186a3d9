//! Ordered, synchronous delivery of [`GameEvent`]s to views.
//!
//! Every emission works on a snapshot of the subscriber list, so a listener
//! may subscribe or unsubscribe (itself or others) while it is being called.
//! Such changes apply from the next emission on.

use std::sync::{Arc, PoisonError, RwLock};

use sapper_common::protocol::GameEvent;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Receives game events synchronously, in emission order.
pub trait GameListener: Send + Sync {
    fn game_changed(&self, event: &GameEvent);
}

impl<F> GameListener for F
where
    F: Fn(&GameEvent) + Send + Sync,
{
    fn game_changed(&self, event: &GameEvent) {
        self(event)
    }
}

#[derive(Clone)]
enum Subscriber {
    Listener(Arc<dyn GameListener>),
    Channel(mpsc::UnboundedSender<GameEvent>),
}

/// Subscriber registry shared by a game and anyone holding a clone.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<(Uuid, Subscriber)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Subscribing the same listener twice returns the
    /// id it already has.
    pub fn subscribe(&self, listener: Arc<dyn GameListener>) -> Uuid {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);

        let existing = subscribers.iter().find_map(|(id, subscriber)| match subscriber {
            Subscriber::Listener(known) if Arc::ptr_eq(known, &listener) => Some(*id),
            _ => None,
        });
        if let Some(id) = existing {
            return id;
        }

        let id = Uuid::new_v4();
        subscribers.push((id, Subscriber::Listener(listener)));
        debug!("Listener {} subscribed, total subscribers: {}", id, subscribers.len());
        id
    }

    /// Subscribes a channel; the receiver sees every event emitted from now on.
    pub fn subscribe_channel(&self) -> (Uuid, mpsc::UnboundedReceiver<GameEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.push((id, Subscriber::Channel(sender)));
        debug!("Channel {} subscribed, total subscribers: {}", id, subscribers.len());
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: &Uuid) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(known, _)| known != id);

        let removed = subscribers.len() != before;
        if removed {
            debug!("Subscriber {} removed, remaining: {}", id, subscribers.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, event: GameEvent) {
        let snapshot = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        trace!("Emitting {:?} to {} subscribers", event, snapshot.len());

        let mut closed = Vec::new();
        for (id, subscriber) in snapshot {
            match subscriber {
                Subscriber::Listener(listener) => listener.game_changed(&event),
                Subscriber::Channel(sender) => {
                    if sender.send(event).is_err() {
                        closed.push(id);
                    }
                }
            }
        }

        for id in closed {
            debug!("Dropping channel {} with no receiver", id);
            self.unsubscribe(&id);
        }
    }
}
