//! Observer instances: one platform watch per root, shared by many subscribers.

use crate::manager::{ManagerInner, ObserverManager};
use crate::options::SubscribeOptions;
use crate::subscription::{Subscription, SubscriptionHandle, SubscriptionId};
use crate::translate;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use domwatch_core::{
    BatchCallback, Dom, Error, MutationRecord, ObserveInit, Result, Selector, WatchId,
};

/// The per-root observer.
///
/// Cloning shares the same instance; identity is pointer identity
/// (`ptr_eq`). The watch runs exactly while the instance has at least one
/// subscription.
pub struct ObserverInstance<D: Dom> {
    pub(crate) inner: Rc<InstanceInner<D>>,
}

pub(crate) struct InstanceInner<D: Dom> {
    dom: D,
    root: D::Node,
    manager: Weak<ManagerInner<D>>,
    state: RefCell<InstanceState<D::Node>>,
}

struct InstanceState<N> {
    /// Live platform watch, if started
    watch: Option<WatchId>,
    /// Subscriptions in registration order
    subscriptions: Vec<Rc<Subscription<N>>>,
    next_id: SubscriptionId,
    /// Set once the manager has dropped this instance
    evicted: bool,
}

impl<D: Dom> ObserverInstance<D> {
    pub(crate) fn new(dom: D, root: D::Node, manager: Weak<ManagerInner<D>>) -> Self {
        Self {
            inner: Rc::new(InstanceInner {
                dom,
                root,
                manager,
                state: RefCell::new(InstanceState {
                    watch: None,
                    subscriptions: Vec::new(),
                    next_id: 1,
                    evicted: false,
                }),
            }),
        }
    }

    /// Registers a subscription and starts the watch if it is the first.
    ///
    /// Fails with `Error::Configuration` for a blank selector or when no
    /// handler is set, with `Error::InvalidSelector` when the host rejects
    /// the selector, and with `Error::InvalidOperation` when the watch cannot
    /// be attached. Nothing is registered on failure.
    ///
    /// An instance already evicted from its manager forwards the call to the
    /// manager's current instance for the same root.
    pub fn subscribe(&self, options: SubscribeOptions<D::Node>) -> Result<SubscriptionHandle<D>> {
        let selector = check_options(&self.inner.dom, &options)?;
        self.register(selector, options)
    }

    /// Registers options that already passed `check_options`.
    pub(crate) fn register(
        &self,
        selector: Option<Selector>,
        options: SubscribeOptions<D::Node>,
    ) -> Result<SubscriptionHandle<D>> {
        if self.is_evicted() {
            let manager = self.inner.manager.upgrade().ok_or_else(|| {
                Error::invalid_operation("observer manager has been dropped")
            })?;
            let current = ObserverManager::from_inner(manager).get_or_create(&self.inner.root);
            tracing::debug!(root = ?self.inner.root, "forwarding subscribe to live instance");
            return current.register(selector, options);
        }

        if !self.is_started() {
            if let Err(err) = InstanceInner::start(&self.inner) {
                if self.subscriber_count() == 0 {
                    InstanceInner::release(&self.inner);
                }
                return Err(err);
            }
        }

        let id = {
            let mut state = self.inner.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state
                .subscriptions
                .push(Rc::new(Subscription::new(id, selector, options)));
            id
        };

        Ok(SubscriptionHandle::new(id, Rc::downgrade(&self.inner)))
    }

    /// The observed root node.
    #[inline]
    pub fn root(&self) -> &D::Node {
        &self.inner.root
    }

    #[inline]
    pub fn dom(&self) -> &D {
        &self.inner.dom
    }

    /// Returns true while the platform watch is attached.
    pub fn is_started(&self) -> bool {
        self.inner.state.borrow().watch.is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.state.borrow().subscriptions.len()
    }

    /// Returns true once the manager has removed this instance.
    pub fn is_evicted(&self) -> bool {
        self.inner.state.borrow().evicted
    }

    /// Returns true if both handles refer to the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ObserverInstance<D>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Validates `options` and asks the host whether it accepts the selector.
pub(crate) fn check_options<D: Dom>(
    dom: &D,
    options: &SubscribeOptions<D::Node>,
) -> Result<Option<Selector>> {
    let selector = options.validate()?;
    if let Some(selector) = &selector {
        dom.check_selector(selector)?;
    }
    Ok(selector)
}

impl<D: Dom> Clone for ObserverInstance<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Dom> fmt::Debug for ObserverInstance<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ObserverInstance")
            .field("root", &self.inner.root)
            .field("watch", &state.watch)
            .field("subscribers", &state.subscriptions.len())
            .field("evicted", &state.evicted)
            .finish()
    }
}

impl<D: Dom> InstanceInner<D> {
    #[inline]
    pub(crate) fn root(&self) -> &D::Node {
        &self.root
    }

    pub(crate) fn has_subscription(&self, id: SubscriptionId) -> bool {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .any(|s| s.id() == id)
    }

    fn start(this: &Rc<Self>) -> Result<()> {
        let weak = Rc::downgrade(this);
        let callback: BatchCallback<D::Node> = Box::new(move |records| {
            if let Some(instance) = weak.upgrade() {
                instance.deliver(records);
            }
        });
        let watch = this
            .dom
            .observe(&this.root, ObserveInit::everything(), callback)?;
        this.state.borrow_mut().watch = Some(watch);
        tracing::debug!(root = ?this.root, watch = watch.0, "observer started");
        Ok(())
    }

    fn stop(&self) {
        let watch = self.state.borrow_mut().watch.take();
        if let Some(watch) = watch {
            self.dom.disconnect(watch);
            tracing::debug!(root = ?self.root, watch = watch.0, "observer stopped");
        }
    }

    /// Routes one batch through the translator.
    fn deliver(&self, records: &[MutationRecord<D::Node>]) {
        let snapshot: Vec<Rc<Subscription<D::Node>>> = self.state.borrow().subscriptions.clone();
        if snapshot.is_empty() {
            return;
        }
        tracing::trace!(
            root = ?self.root,
            records = records.len(),
            subscribers = snapshot.len(),
            "dispatching batch"
        );
        translate::dispatch(&self.dom, &snapshot, records);
    }

    /// Removes one subscription; the last one out stops the watch and
    /// evicts the instance.
    pub(crate) fn unsubscribe(this: &Rc<Self>, id: SubscriptionId) {
        let (removed, now_empty) = {
            let mut state = this.state.borrow_mut();
            match state.subscriptions.iter().position(|s| s.id() == id) {
                Some(pos) => {
                    let removed = state.subscriptions.remove(pos);
                    (Some(removed), state.subscriptions.is_empty())
                }
                None => (None, false),
            }
        };

        let Some(subscription) = removed else {
            return;
        };
        subscription.deactivate();

        if now_empty {
            Self::release(this);
        }
    }

    /// Evicts through the manager when it is still alive.
    fn release(this: &Rc<Self>) {
        match this.manager.upgrade() {
            Some(manager) => manager.remove(this),
            None => this.evict(),
        }
    }

    /// Stops the watch, deactivates what is left and marks the instance
    /// evicted. Never invokes a handler.
    pub(crate) fn evict(&self) {
        self.stop();
        let remaining = {
            let mut state = self.state.borrow_mut();
            state.evicted = true;
            core::mem::take(&mut state.subscriptions)
        };
        for subscription in &remaining {
            subscription.deactivate();
        }
    }
}

impl<D: Dom> Drop for InstanceInner<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
