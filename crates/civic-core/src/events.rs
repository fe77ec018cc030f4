//! Explicit observer lists for change notification.
//!
//! A [`Broadcast`] owns a list of subscriber channels. Publishing sends a
//! clone of the event to every live subscriber and prunes the ones whose
//! receiver has been dropped, so a subscriber can leave either by calling
//! [`Broadcast::unsubscribe`] or by dropping its [`Subscription`].

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Handle identifying one subscription to a [`Broadcast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: Receiver<T>,
}

impl<T> Subscription<T> {
    /// The id to pass to [`Broadcast::unsubscribe`].
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The underlying channel, for use in `crossbeam_channel::select!`.
    pub fn receiver(&self) -> &Receiver<T> {
        &self.receiver
    }

    /// Take the next event without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Consume the subscription, keeping only the channel.
    pub fn into_receiver(self) -> Receiver<T> {
        self.receiver
    }
}

struct Subscribers<T> {
    next_id: u64,
    senders: Vec<(SubscriptionId, Sender<T>)>,
}

/// A cloneable, thread-safe observer list.
///
/// Clones share the same subscriber list.
pub struct Broadcast<T> {
    inner: Arc<Mutex<Subscribers<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Broadcast<T> {
    /// An empty observer list.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                senders: Vec::new(),
            })),
        }
    }

    /// Register a new subscriber with an unbounded queue.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.senders.push((id, tx));
        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subs.senders.len();
        subs.senders.retain(|(sid, _)| *sid != id);
        subs.senders.len() != before
    }

    /// Number of registered subscribers, including any not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }
}

impl<T: Clone> Broadcast<T> {
    /// Deliver `event` to every live subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: T) -> usize {
        let mut subs = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        subs.senders
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
        subs.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives() {
        let bus = Broadcast::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert_eq!(bus.publish(7u32), 2);
        assert_eq!(a.try_recv(), Ok(7));
        assert_eq!(b.try_recv(), Ok(7));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = Broadcast::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        assert!(bus.unsubscribe(a.id()));
        assert!(!bus.unsubscribe(a.id()));
        assert_eq!(bus.publish("x"), 1);
        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv(), Ok("x"));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = Broadcast::new();
        let a = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.publish(1u8), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(a.try_recv(), Ok(1));
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = Broadcast::new();
        let sub = bus.subscribe();
        bus.clone().publish(5i64);
        assert_eq!(sub.try_recv(), Ok(5));
    }
}
