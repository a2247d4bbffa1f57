//! Subscription options.

use crate::event::{Descent, EventKind, MutationEvent};
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;
use domwatch_core::{Error, Result, Selector};

/// Handler invoked once per qualifying event.
pub type Handler<N> = Rc<dyn Fn(&MutationEvent<N>)>;

/// Recursive-descent policy per event kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DescentPolicy {
    pub add: Descent,
    pub remove: Descent,
    pub attribute: Descent,
}

impl DescentPolicy {
    /// The same policy for every kind.
    pub const fn uniform(descent: Descent) -> Self {
        Self {
            add: descent,
            remove: descent,
            attribute: descent,
        }
    }

    #[inline]
    pub fn get(&self, kind: EventKind) -> Descent {
        match kind {
            EventKind::Add => self.add,
            EventKind::Remove => self.remove,
            EventKind::Attribute => self.attribute,
        }
    }

    pub fn set(&mut self, kind: EventKind, descent: Descent) {
        match kind {
            EventKind::Add => self.add = descent,
            EventKind::Remove => self.remove = descent,
            EventKind::Attribute => self.attribute = descent,
        }
    }
}

/// Options for `ObserverInstance::subscribe`.
///
/// # Example
///
/// ```ignore
/// let options = SubscribeOptions::selector("li.item")
///     .descend(EventKind::Add, Descent::All)
///     .on_add(|event| println!("added {:?}", event.node))
///     .on_remove(|event| println!("removed {:?}", event.node));
/// ```
pub struct SubscribeOptions<N> {
    pub(crate) selector: Option<String>,
    pub(crate) descent: DescentPolicy,
    pub(crate) handlers: [Option<Handler<N>>; 3],
}

impl<N> SubscribeOptions<N> {
    /// Options filtered by `selector`.
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::with_selector(Some(selector.into()))
    }

    /// Options that report every element, unfiltered.
    pub fn match_all() -> Self {
        Self::with_selector(None)
    }

    /// `None` means match-all.
    pub fn with_selector(selector: Option<String>) -> Self {
        Self {
            selector,
            descent: DescentPolicy::default(),
            handlers: [None, None, None],
        }
    }

    /// Replaces the whole descent policy.
    pub fn descent(mut self, policy: DescentPolicy) -> Self {
        self.descent = policy;
        self
    }

    /// Sets the descent policy for one kind.
    pub fn descend(mut self, kind: EventKind, descent: Descent) -> Self {
        self.descent.set(kind, descent);
        self
    }

    /// Registers the handler for one kind, replacing any previous one.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&MutationEvent<N>) + 'static,
    {
        self.handlers[kind.index()] = Some(Rc::new(handler));
        self
    }

    /// Registers one handler for every kind; dispatch on `event.change`.
    pub fn on_any<F>(mut self, handler: F) -> Self
    where
        F: Fn(&MutationEvent<N>) + 'static,
    {
        let handler: Handler<N> = Rc::new(handler);
        for kind in EventKind::ALL {
            self.handlers[kind.index()] = Some(handler.clone());
        }
        self
    }

    pub fn on_add<F>(self, handler: F) -> Self
    where
        F: Fn(&MutationEvent<N>) + 'static,
    {
        self.on(EventKind::Add, handler)
    }

    pub fn on_remove<F>(self, handler: F) -> Self
    where
        F: Fn(&MutationEvent<N>) + 'static,
    {
        self.on(EventKind::Remove, handler)
    }

    pub fn on_attribute<F>(self, handler: F) -> Self
    where
        F: Fn(&MutationEvent<N>) + 'static,
    {
        self.on(EventKind::Attribute, handler)
    }

    /// Returns true if a handler is registered for `kind`.
    #[inline]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers[kind.index()].is_some()
    }

    /// Checks the options and returns the validated selector.
    ///
    /// Fails with `Error::Configuration` when the selector is present but
    /// blank, or when no handler is registered.
    pub fn validate(&self) -> Result<Option<Selector>> {
        let selector = Selector::optional(self.selector.as_deref())?;
        if self.handlers.iter().all(Option::is_none) {
            return Err(Error::configuration(
                "You must register at least one type of listener",
            ));
        }
        Ok(selector)
    }
}

impl<N> fmt::Debug for SubscribeOptions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("selector", &self.selector)
            .field("descent", &self.descent)
            .field("on_add", &self.handles(EventKind::Add))
            .field("on_remove", &self.handles(EventKind::Remove))
            .field("on_attribute", &self.handles(EventKind::Attribute))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_blank_selector() {
        let options: SubscribeOptions<u32> = SubscribeOptions::selector("  ").on_add(|_| {});
        assert!(options.validate().unwrap_err().is_configuration());

        let options: SubscribeOptions<u32> = SubscribeOptions::selector("").on_add(|_| {});
        assert!(options.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_validate_requires_handler() {
        let options: SubscribeOptions<u32> = SubscribeOptions::selector("div");
        assert!(options.validate().unwrap_err().is_configuration());

        let options: SubscribeOptions<u32> = SubscribeOptions::match_all();
        assert!(options.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_match_all_is_valid() {
        let options: SubscribeOptions<u32> = SubscribeOptions::match_all().on_remove(|_| {});
        assert_eq!(options.validate().unwrap(), None);
    }

    #[test]
    fn test_on_any_registers_every_kind() {
        let options: SubscribeOptions<u32> = SubscribeOptions::selector("div").on_any(|_| {});
        for kind in EventKind::ALL {
            assert!(options.handles(kind));
        }
    }

    #[test]
    fn test_descent_builder() {
        let options: SubscribeOptions<u32> = SubscribeOptions::selector("div")
            .descent(DescentPolicy::uniform(Descent::Single))
            .descend(EventKind::Remove, Descent::All);
        assert_eq!(options.descent.add, Descent::Single);
        assert_eq!(options.descent.remove, Descent::All);
        assert_eq!(options.descent.get(EventKind::Attribute), Descent::Single);
    }
}
