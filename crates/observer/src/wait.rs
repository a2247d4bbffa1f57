//! Waiting for an element to appear.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use domwatch_core::{Dom, ObserveInit, Result, Selector, TimerId, WatchId};
use futures::channel::oneshot;
use futures::FutureExt;

/// Default `wait_for_element` timeout in milliseconds.
pub const WAIT_FOR_ELEMENT_DEFAULT_TIMEOUT: u32 = 10_000;

/// Options for `wait_for_element`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitOptions<N> {
    /// Search scope; `None` means the document node
    pub root: Option<N>,
    /// Milliseconds before resolving with `None`
    pub timeout_ms: u32,
}

impl<N> Default for WaitOptions<N> {
    fn default() -> Self {
        Self {
            root: None,
            timeout_ms: WAIT_FOR_ELEMENT_DEFAULT_TIMEOUT,
        }
    }
}

impl<N> WaitOptions<N> {
    pub fn root(mut self, root: N) -> Self {
        self.root = Some(root);
        self
    }

    pub fn timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Resolves with the first descendant of the root matching `selector`.
///
/// Checks synchronously first. Otherwise a child-list watch on the root
/// re-queries after every batch until a match shows up, and a timer
/// resolves `None` after `options.timeout_ms`. Whichever settles first tears
/// the other down.
///
/// Fails with `Error::Configuration` for a blank selector, with
/// `Error::InvalidSelector` when the host rejects it, and with
/// `Error::InvalidOperation` when the watch cannot be attached.
pub fn wait_for_element<D: Dom>(
    dom: &D,
    selector: &str,
    options: WaitOptions<D::Node>,
) -> Result<WaitForElement<D>> {
    let selector = Selector::new(selector)?;
    dom.check_selector(&selector)?;
    let root = options.root.unwrap_or_else(|| dom.document());

    let (sender, receiver) = oneshot::channel();
    let state = Rc::new(WaitState {
        dom: dom.clone(),
        sender: RefCell::new(Some(sender)),
        watch: Cell::new(None),
        timer: Cell::new(None),
    });

    if let Some(found) = dom.query_selector(&root, &selector) {
        state.settle(Some(found));
        return Ok(WaitForElement { receiver, state });
    }

    let weak = Rc::downgrade(&state);
    let scope = root.clone();
    let watched = selector.clone();
    let watch = dom.observe(
        &root,
        ObserveInit::child_list_subtree(),
        Box::new(move |_records| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if let Some(found) = state.dom.query_selector(&scope, &watched) {
                state.settle(Some(found));
            }
        }),
    )?;
    state.watch.set(Some(watch));

    let weak: Weak<WaitState<D>> = Rc::downgrade(&state);
    let timer = dom.set_timeout(
        options.timeout_ms,
        Box::new(move || {
            if let Some(state) = weak.upgrade() {
                tracing::debug!("wait_for_element timed out");
                state.settle(None);
            }
        }),
    );
    state.timer.set(Some(timer));

    tracing::debug!(selector = %selector, timeout_ms = options.timeout_ms, "waiting for element");
    Ok(WaitForElement { receiver, state })
}

struct WaitState<D: Dom> {
    dom: D,
    /// Present until settled
    sender: RefCell<Option<oneshot::Sender<Option<D::Node>>>>,
    watch: Cell<Option<WatchId>>,
    timer: Cell<Option<TimerId>>,
}

impl<D: Dom> WaitState<D> {
    fn settle(&self, value: Option<D::Node>) {
        let sender = self.sender.borrow_mut().take();
        if let Some(sender) = sender {
            self.teardown();
            // the receiver may already be gone
            let _ = sender.send(value);
        }
    }

    fn cancel(&self) {
        if self.sender.borrow_mut().take().is_some() {
            self.teardown();
        }
    }

    fn teardown(&self) {
        if let Some(watch) = self.watch.take() {
            self.dom.disconnect(watch);
        }
        if let Some(timer) = self.timer.take() {
            self.dom.clear_timeout(timer);
        }
    }

    fn is_settled(&self) -> bool {
        self.sender.borrow().is_none()
    }
}

/// Future returned by `wait_for_element`.
///
/// Resolves to `Some(element)` or to `None` on timeout. Dropping it before
/// it resolves detaches the watch and clears the timer.
#[must_use = "futures do nothing unless polled"]
pub struct WaitForElement<D: Dom> {
    receiver: oneshot::Receiver<Option<D::Node>>,
    state: Rc<WaitState<D>>,
}

impl<D: Dom> WaitForElement<D> {
    /// Returns true once a match was found or the timeout fired.
    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }
}

impl<D: Dom> Future for WaitForElement<D> {
    type Output = Option<D::Node>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(found)) => Poll::Ready(found),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<D: Dom> Drop for WaitForElement<D> {
    fn drop(&mut self) {
        self.state.cancel();
    }
}

impl<D: Dom> fmt::Debug for WaitForElement<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitForElement")
            .field("settled", &self.is_settled())
            .finish()
    }
}
