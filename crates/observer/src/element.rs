//! Standalone single-selector watcher.
//!
//! Unlike `ObserverManager` subscriptions, an `ElementWatcher` owns its own
//! platform watch and is started and stopped explicitly. It only asks the
//! host for the record types its handlers consume.

use crate::event::{Descent, EventKind};
use crate::options::SubscribeOptions;
use crate::subscription::Subscription;
use crate::translate;
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;
use domwatch_core::{Dom, Error, ObserveInit, Result, WatchId};

/// Builds a stopped watcher for `options` on `root` (default: the body, or
/// the document node while there is no body).
///
/// Add and remove events search at least one level into inserted or
/// removed subtrees (`Descent::Single`); an explicit `Descent::All` is kept.
///
/// Fails with `Error::Configuration` when the options have no selector, a
/// blank selector, or no handler.
pub fn observe_element<D: Dom>(
    dom: &D,
    root: Option<D::Node>,
    mut options: SubscribeOptions<D::Node>,
) -> Result<ElementWatcher<D>> {
    for kind in [EventKind::Add, EventKind::Remove] {
        if options.descent.get(kind) == Descent::None {
            options.descent.set(kind, Descent::Single);
        }
    }

    let selector = options
        .validate()?
        .ok_or_else(|| Error::configuration("Element watcher requires a selector"))?;
    dom.check_selector(&selector)?;

    let mut init = ObserveInit::default();
    if options.handles(EventKind::Add) || options.handles(EventKind::Remove) {
        init.child_list = true;
        init.subtree = true;
    }
    if options.handles(EventKind::Attribute) {
        init.attributes = true;
        init.attribute_old_value = true;
    }

    let root = root
        .or_else(|| dom.body())
        .unwrap_or_else(|| dom.document());

    Ok(ElementWatcher {
        inner: Rc::new(WatcherInner {
            dom: dom.clone(),
            root,
            init,
            subscription: Rc::new(Subscription::new(1, Some(selector), options)),
            watch: Cell::new(None),
        }),
    })
}

/// Start/stop control over one selector watch.
///
/// Dropping the watcher stops it.
pub struct ElementWatcher<D: Dom> {
    inner: Rc<WatcherInner<D>>,
}

struct WatcherInner<D: Dom> {
    dom: D,
    root: D::Node,
    init: ObserveInit,
    subscription: Rc<Subscription<D::Node>>,
    watch: Cell<Option<WatchId>>,
}

impl<D: Dom> ElementWatcher<D> {
    /// Attaches the watch. No-op when already started.
    pub fn start(&self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }
        let weak = Rc::downgrade(&self.inner);
        let watch = self.inner.dom.observe(
            &self.inner.root,
            self.inner.init,
            Box::new(move |records| {
                if let Some(inner) = weak.upgrade() {
                    translate::dispatch(
                        &inner.dom,
                        core::slice::from_ref(&inner.subscription),
                        records,
                    );
                }
            }),
        )?;
        self.inner.watch.set(Some(watch));
        Ok(())
    }

    /// Detaches the watch; undelivered records are dropped.
    pub fn stop(&self) {
        if let Some(watch) = self.inner.watch.take() {
            self.inner.dom.disconnect(watch);
        }
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.inner.watch.get().is_some()
    }

    /// The record types this watcher asks the host for.
    #[inline]
    pub fn init(&self) -> ObserveInit {
        self.inner.init
    }

    #[inline]
    pub fn root(&self) -> &D::Node {
        &self.inner.root
    }
}

impl<D: Dom> Drop for ElementWatcher<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<D: Dom> fmt::Debug for ElementWatcher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementWatcher")
            .field("root", &self.inner.root)
            .field("init", &self.inner.init)
            .field("started", &self.is_started())
            .finish()
    }
}
