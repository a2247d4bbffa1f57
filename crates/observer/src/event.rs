//! Mutation events delivered to subscribers.

use alloc::string::String;

/// Recursive-descent policy for one event kind.
///
/// Also recorded on each event: `None` for a direct match, otherwise the
/// policy that found the element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Descent {
    /// Only the notified element itself is considered.
    #[default]
    None,
    /// The first matching descendant, in document order.
    Single,
    /// Every matching descendant, in document order.
    All,
}

impl Descent {
    /// Parses `"none"`, `"single"` or `"all"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Descent::None),
            "single" => Some(Descent::Single),
            "all" => Some(Descent::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Descent::None => "none",
            Descent::Single => "single",
            Descent::All => "all",
        }
    }
}

/// The kind of change a handler can be registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Remove,
    Attribute,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Add, EventKind::Remove, EventKind::Attribute];

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            EventKind::Add => 0,
            EventKind::Remove => 1,
            EventKind::Attribute => 2,
        }
    }
}

/// What happened to the element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Added,
    Removed,
    AttributeChanged {
        /// Name of the changed attribute
        name: String,
        /// Value before the change; `None` if the attribute did not exist
        old_value: Option<String>,
    },
}

impl Change {
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Change::Added => EventKind::Add,
            Change::Removed => EventKind::Remove,
            Change::AttributeChanged { .. } => EventKind::Attribute,
        }
    }
}

/// One observed change for one subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationEvent<N> {
    /// The element the event is about
    pub node: N,
    pub change: Change,
    /// How the element was found
    pub descent: Descent,
}

impl<N> MutationEvent<N> {
    pub fn new(node: N, change: Change, descent: Descent) -> Self {
        Self {
            node,
            change,
            descent,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.change.kind()
    }

    /// Attribute name for attribute events.
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.change {
            Change::AttributeChanged { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Previous attribute value for attribute events.
    pub fn old_value(&self) -> Option<&str> {
        match &self.change {
            Change::AttributeChanged { old_value, .. } => old_value.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descent_names() {
        for descent in [Descent::None, Descent::Single, Descent::All] {
            assert_eq!(Descent::from_name(descent.as_str()), Some(descent));
        }
        assert_eq!(Descent::from_name("deep"), None);
        assert_eq!(Descent::default(), Descent::None);
    }

    #[test]
    fn test_event_accessors() {
        let event = MutationEvent::new(
            7u32,
            Change::AttributeChanged {
                name: "class".into(),
                old_value: Some("a".into()),
            },
            Descent::Single,
        );
        assert_eq!(event.kind(), EventKind::Attribute);
        assert_eq!(event.attribute_name(), Some("class"));
        assert_eq!(event.old_value(), Some("a"));

        let added = MutationEvent::new(7u32, Change::Added, Descent::None);
        assert_eq!(added.kind(), EventKind::Add);
        assert_eq!(added.attribute_name(), None);
    }
}
