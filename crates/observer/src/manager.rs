//! Observer Instance Manager.
//!
//! Keeps at most one `ObserverInstance` per root node. Instances are created
//! lazily and evicted when their last subscriber leaves.

use crate::instance::{check_options, InstanceInner, ObserverInstance};
use crate::options::SubscribeOptions;
use crate::subscription::SubscriptionHandle;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use domwatch_core::{Dom, Result};
use hashbrown::HashMap;

/// Identity-keyed table of observer instances.
///
/// Cloning shares the same table.
pub struct ObserverManager<D: Dom> {
    inner: Rc<ManagerInner<D>>,
}

pub(crate) struct ManagerInner<D: Dom> {
    dom: D,
    instances: RefCell<HashMap<D::Node, ObserverInstance<D>>>,
}

impl<D: Dom> ObserverManager<D> {
    pub fn new(dom: D) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                dom,
                instances: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ManagerInner<D>>) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn dom(&self) -> &D {
        &self.inner.dom
    }

    /// Returns the instance for `root`, creating a stopped one if needed.
    pub fn get_or_create(&self, root: &D::Node) -> ObserverInstance<D> {
        let mut instances = self.inner.instances.borrow_mut();
        if let Some(instance) = instances.get(root) {
            return instance.clone();
        }
        let instance =
            ObserverInstance::new(self.inner.dom.clone(), root.clone(), Rc::downgrade(&self.inner));
        instances.insert(root.clone(), instance.clone());
        tracing::debug!(root = ?root, "observer instance created");
        instance
    }

    pub fn get(&self, root: &D::Node) -> Option<ObserverInstance<D>> {
        self.inner.instances.borrow().get(root).cloned()
    }

    /// Evicts `instance`: detaches its watch, deactivates any remaining
    /// subscriptions and drops the table entry if it is still this instance.
    /// Idempotent.
    pub fn remove(&self, instance: &ObserverInstance<D>) {
        self.inner.remove(&instance.inner);
    }

    /// Subscribes on `root`, creating its instance on demand.
    ///
    /// Options are checked before the instance is looked up, so a failed
    /// call leaves the table untouched.
    pub fn subscribe(
        &self,
        root: &D::Node,
        options: SubscribeOptions<D::Node>,
    ) -> Result<SubscriptionHandle<D>> {
        let selector = check_options(&self.inner.dom, &options)?;
        self.get_or_create(root).register(selector, options)
    }

    /// Subscribes on the document body, or on the document node while there
    /// is no body yet.
    pub fn subscribe_default(
        &self,
        options: SubscribeOptions<D::Node>,
    ) -> Result<SubscriptionHandle<D>> {
        let root = self
            .inner
            .dom
            .body()
            .unwrap_or_else(|| self.inner.dom.document());
        self.subscribe(&root, options)
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.inner.instances.borrow().len()
    }
}

impl<D: Dom> Clone for ObserverManager<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Dom> fmt::Debug for ObserverManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverManager")
            .field("instances", &self.instance_count())
            .finish()
    }
}

impl<D: Dom> ManagerInner<D> {
    pub(crate) fn remove(&self, instance: &Rc<InstanceInner<D>>) {
        instance.evict();

        let removed = {
            let mut instances = self.instances.borrow_mut();
            let is_current = instances
                .get(instance.root())
                .map(|current| Rc::ptr_eq(&current.inner, instance))
                .unwrap_or(false);
            if is_current {
                instances.remove(instance.root())
            } else {
                None
            }
        };

        if removed.is_some() {
            tracing::debug!(root = ?instance.root(), "observer instance evicted");
        }
    }
}
