//! Running a callback once the document body exists.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;
use domwatch_core::{Dom, ObserveInit, Result, WatchId};

/// Calls `callback` with the body as soon as it exists.
///
/// When the body is already there the callback runs synchronously and
/// `None` is returned. Otherwise the document node is watched and the
/// callback runs once, on the first batch after which the body exists; the
/// returned `BodyReadyCancel` aborts the wait.
///
/// Fails with `Error::InvalidOperation` when the watch cannot be attached.
pub fn on_body_ready<D, F>(dom: &D, callback: F) -> Result<Option<BodyReadyCancel<D>>>
where
    D: Dom,
    F: FnOnce(D::Node) + 'static,
{
    if let Some(body) = dom.body() {
        callback(body);
        return Ok(None);
    }

    let state = Rc::new(BodyWait {
        dom: dom.clone(),
        watch: Cell::new(None),
        callback: RefCell::new(Some(Box::new(callback) as Box<dyn FnOnce(D::Node)>)),
    });

    // Owned by the watch until it is disconnected.
    let owned = state.clone();
    let watch = dom.observe(
        &dom.document(),
        ObserveInit::child_list_subtree(),
        Box::new(move |_records| {
            let state = &owned;
            let Some(body) = state.dom.body() else {
                return;
            };
            state.detach();
            let callback = state.callback.borrow_mut().take();
            if let Some(callback) = callback {
                tracing::debug!(body = ?body, "body ready");
                callback(body);
            }
        }),
    )?;
    state.watch.set(Some(watch));

    Ok(Some(BodyReadyCancel { state }))
}

struct BodyWait<D: Dom> {
    dom: D,
    watch: Cell<Option<WatchId>>,
    callback: RefCell<Option<Box<dyn FnOnce(D::Node)>>>,
}

impl<D: Dom> BodyWait<D> {
    fn detach(&self) {
        if let Some(watch) = self.watch.take() {
            self.dom.disconnect(watch);
        }
    }
}

/// Cancels a pending `on_body_ready` wait.
///
/// Dropping the token does not cancel the wait.
pub struct BodyReadyCancel<D: Dom> {
    state: Rc<BodyWait<D>>,
}

impl<D: Dom> BodyReadyCancel<D> {
    /// Detaches the watch without calling the callback. A no-op once the
    /// callback has run.
    pub fn cancel(&self) {
        self.state.detach();
        self.state.callback.borrow_mut().take();
    }

    /// Returns true while the callback has neither run nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.state.callback.borrow().is_some()
    }
}

impl<D: Dom> fmt::Debug for BodyReadyCancel<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyReadyCancel")
            .field("pending", &self.is_pending())
            .finish()
    }
}
