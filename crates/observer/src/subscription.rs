//! Subscriptions and the handles that cancel them.

use crate::event::{Descent, EventKind, MutationEvent};
use crate::instance::InstanceInner;
use crate::options::{DescentPolicy, Handler, SubscribeOptions};
use alloc::rc::Weak;
use core::cell::Cell;
use core::fmt;
use domwatch_core::{Dom, Selector};

/// Unique identifier for a subscription within one instance.
pub type SubscriptionId = u64;

/// A validated subscription.
pub(crate) struct Subscription<N> {
    /// Unique identifier
    id: SubscriptionId,
    /// `None` matches every element
    selector: Option<Selector>,
    descent: DescentPolicy,
    handlers: [Option<Handler<N>>; 3],
    /// Cleared on unsubscribe; checked before every handler call
    active: Cell<bool>,
}

impl<N> Subscription<N> {
    pub(crate) fn new(
        id: SubscriptionId,
        selector: Option<Selector>,
        options: SubscribeOptions<N>,
    ) -> Self {
        Self {
            id,
            selector,
            descent: options.descent,
            handlers: options.handlers,
            active: Cell::new(true),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    #[inline]
    pub(crate) fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    #[inline]
    pub(crate) fn descent(&self, kind: EventKind) -> Descent {
        self.descent.get(kind)
    }

    #[inline]
    pub(crate) fn handles(&self, kind: EventKind) -> bool {
        self.handlers[kind.index()].is_some()
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    #[inline]
    pub(crate) fn deactivate(&self) {
        self.active.set(false);
    }

    /// Invokes the handler for the event's kind, if still active.
    pub(crate) fn notify(&self, event: &MutationEvent<N>) {
        if !self.is_active() {
            return;
        }
        if let Some(handler) = &self.handlers[event.kind().index()] {
            handler(event);
        }
    }
}

/// Caller-owned token for one subscription.
///
/// Dropping the handle does not cancel the subscription; call
/// `unsubscribe`.
pub struct SubscriptionHandle<D: Dom> {
    id: SubscriptionId,
    instance: Weak<InstanceInner<D>>,
    released: Cell<bool>,
}

impl<D: Dom> SubscriptionHandle<D> {
    pub(crate) fn new(id: SubscriptionId, instance: Weak<InstanceInner<D>>) -> Self {
        Self {
            id,
            instance,
            released: Cell::new(false),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Cancels the subscription. Safe to call any number of times.
    ///
    /// No handler of this subscription runs after this returns. When it was
    /// the root's last subscription, the watch stops and the instance is
    /// evicted from its manager.
    pub fn unsubscribe(&self) {
        if self.released.replace(true) {
            return;
        }
        if let Some(instance) = self.instance.upgrade() {
            InstanceInner::unsubscribe(&instance, self.id);
        }
    }

    /// Returns true until `unsubscribe` is called or the instance is removed.
    pub fn is_active(&self) -> bool {
        !self.released.get()
            && self
                .instance
                .upgrade()
                .map(|instance| instance.has_subscription(self.id))
                .unwrap_or(false)
    }
}

impl<D: Dom> fmt::Debug for SubscriptionHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("released", &self.released.get())
            .finish()
    }
}
