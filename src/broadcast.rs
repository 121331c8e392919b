//! Process-wide "data changed" signalling.
//!
//! A [`Channel`] is a typed observer list shared by cheap clones. Writers call
//! [`Channel::emit`] after a successful remote or storage write; listeners
//! registered with [`Channel::subscribe`] are invoked once per emit and are
//! expected to refetch their own slice of state.
//!
//! Teardown is deterministic: [`Subscription`] removes its handler when
//! dropped, so a component that owns its subscription cannot leak a listener.
//! Components that refetch lazily use a [`RefreshFlag`], whose handler holds
//! only a weak reference and therefore never touches a torn-down component.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// The payload-free signal broadcast after any write to shared data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataChanged;

pub type UpdateChannel = Channel<DataChanged>;

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Observers<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
    queue: VecDeque<E>,
    dispatching: bool,
}

/// Type-erased view of an observer list, so [`Subscription`] does not carry
/// the event type.
trait Detach {
    fn detach(&self, id: u64) -> bool;
    fn holds(&self, id: u64) -> bool;
}

impl<E> Detach for RefCell<Observers<E>> {
    fn detach(&self, id: u64) -> bool {
        let mut observers = self.borrow_mut();
        observers.remove(id)
    }

    fn holds(&self, id: u64) -> bool {
        let observers = self.borrow();
        observers.is_subscribed(id)
    }
}

impl<E> Observers<E> {
    fn is_subscribed(&self, id: u64) -> bool {
        self.handlers.iter().any(|(hid, _)| *hid == id)
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _)| *hid != id);
        self.handlers.len() != before
    }
}

pub struct Channel<E> {
    inner: Rc<RefCell<Observers<E>>>,
}

impl<E> Clone for Channel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> Channel<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Observers {
                next_id: 0,
                handlers: Vec::new(),
                queue: VecDeque::new(),
                dispatching: false,
            })),
        }
    }

    /// Register `handler` for every future emit until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes the handler immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
        E: 'static,
    {
        let mut observers = self.inner.borrow_mut();
        let id = observers.next_id;
        observers.next_id += 1;
        let handler: Handler<E> = Rc::new(RefCell::new(handler));
        observers.handlers.push((id, handler));
        tracing::trace!(id, "broadcast subscriber added");
        let owner: Weak<RefCell<Observers<E>>> = Rc::downgrade(&self.inner);
        let owner: Weak<dyn Detach> = owner;
        Subscription {
            id,
            owner: Some(owner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    /// Fire-and-forget dispatch.
    ///
    /// Every handler subscribed when this event's round starts runs exactly
    /// once. Emits issued from inside a handler are queued behind the current
    /// round instead of re-entering it.
    pub fn emit(&self, event: E) {
        {
            let mut observers = self.inner.borrow_mut();
            observers.queue.push_back(event);
            if observers.dispatching {
                return;
            }
            observers.dispatching = true;
        }
        let _reset = DispatchGuard { inner: &self.inner };
        loop {
            let (event, round) = {
                let mut observers = self.inner.borrow_mut();
                let Some(event) = observers.queue.pop_front() else {
                    break;
                };
                let round: Vec<(u64, Handler<E>)> = observers
                    .handlers
                    .iter()
                    .map(|(id, h)| (*id, Rc::clone(h)))
                    .collect();
                (event, round)
            };
            tracing::debug!(listeners = round.len(), "broadcast emit");
            for (id, handler) in round {
                if !self.inner.borrow().is_subscribed(id) {
                    continue;
                }
                (handler.borrow_mut())(&event);
            }
        }
    }
}

struct DispatchGuard<'a, E> {
    inner: &'a Rc<RefCell<Observers<E>>>,
}

impl<E> Drop for DispatchGuard<'_, E> {
    fn drop(&mut self) {
        if let Ok(mut observers) = self.inner.try_borrow_mut() {
            observers.dispatching = false;
            // A panicking handler leaves queued events behind; drop them.
            observers.queue.clear();
        }
    }
}

/// Handle returned by [`Channel::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    owner: Option<Weak<dyn Detach>>,
}

impl Subscription {
    /// Remove the handler now. Returns `false` if it was already gone.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    pub fn is_active(&self) -> bool {
        self.owner
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|owner| owner.holds(self.id))
    }

    fn release(&mut self) -> bool {
        match self.owner.take().and_then(|owner| owner.upgrade()) {
            Some(owner) => owner.detach(self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.release() {
            tracing::trace!(id = self.id, "broadcast subscriber dropped");
        }
    }
}

/// Component-owned dirty bit driven by the update channel.
///
/// The subscribed handler only marks the flag; the owning component performs
/// its refetch on its next tick. Once the component (and with it the flag) is
/// gone, the handler is a no-op even if the subscription somehow outlived it.
#[derive(Debug, Default)]
pub struct RefreshFlag {
    dirty: Rc<Cell<bool>>,
}

impl RefreshFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&self, channel: &UpdateChannel) -> Subscription {
        let weak = Rc::downgrade(&self.dirty);
        channel.subscribe(move |_| {
            if let Some(dirty) = weak.upgrade() {
                dirty.set(true);
            }
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Consume the pending refresh, if any.
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(channel: &UpdateChannel) -> (Rc<Cell<usize>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let sub = channel.subscribe(move |_| seen.set(seen.get() + 1));
        (hits, sub)
    }

    #[test]
    fn emit_reaches_every_subscriber_once() {
        let channel = UpdateChannel::new();
        let (a, _sa) = counter(&channel);
        let (b, sb) = counter(&channel);
        channel.emit(DataChanged);
        assert_eq!((a.get(), b.get()), (1, 1));

        assert!(sb.unsubscribe());
        channel.emit(DataChanged);
        assert_eq!((a.get(), b.get()), (2, 1));
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let channel = UpdateChannel::new();
        let (hits, sub) = counter(&channel);
        assert_eq!(channel.subscriber_count(), 1);
        drop(sub);
        assert_eq!(channel.subscriber_count(), 0);
        channel.emit(DataChanged);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn nested_emit_is_queued_not_reentrant() {
        let channel = UpdateChannel::new();
        let hits = Rc::new(Cell::new(0));
        let depth = Rc::new(Cell::new(0));
        let max_depth = Rc::new(Cell::new(0));
        let inner = channel.clone();
        let (h, d, m) = (Rc::clone(&hits), Rc::clone(&depth), Rc::clone(&max_depth));
        let _sub = channel.subscribe(move |_| {
            d.set(d.get() + 1);
            m.set(m.get().max(d.get()));
            h.set(h.get() + 1);
            if h.get() == 1 {
                inner.emit(DataChanged);
            }
            d.set(d.get() - 1);
        });
        channel.emit(DataChanged);
        assert_eq!(hits.get(), 2);
        assert_eq!(max_depth.get(), 1);
    }

    #[test]
    fn handler_removed_mid_round_is_skipped() {
        let channel = UpdateChannel::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&victim);
        let _killer = channel.subscribe(move |_| {
            slot.borrow_mut().take();
        });
        let (hits, sub) = counter(&channel);
        *victim.borrow_mut() = Some(sub);
        channel.emit(DataChanged);
        assert_eq!(hits.get(), 0);
        assert_eq!(channel.subscriber_count(), 1);
    }

    #[test]
    fn subscription_outliving_channel_is_inert() {
        let channel = UpdateChannel::new();
        let (_hits, sub) = counter(&channel);
        assert!(sub.is_active());
        drop(channel);
        assert!(!sub.is_active());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn refresh_flag_marks_and_ignores_dead_owner() {
        let channel = UpdateChannel::new();
        let flag = RefreshFlag::new();
        let sub = flag.listen(&channel);
        channel.emit(DataChanged);
        assert!(flag.take());
        assert!(!flag.take());

        drop(flag);
        // the handler is still registered but has nothing left to mark
        channel.emit(DataChanged);
        assert!(sub.is_active());
    }
}
