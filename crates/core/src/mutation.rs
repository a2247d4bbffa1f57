//! Raw mutation records as delivered by a host.

use alloc::string::String;
use alloc::vec::Vec;

/// One raw change record, scoped to a single target node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord<N> {
    /// Children of `target` were added and/or removed.
    ChildList {
        target: N,
        added: Vec<N>,
        removed: Vec<N>,
    },
    /// Attribute `name` of `target` changed.
    ///
    /// `old_value` is only populated when the watch asked for old values;
    /// it is `None` if the attribute did not exist before the change.
    Attributes {
        target: N,
        name: String,
        old_value: Option<String>,
    },
}

impl<N> MutationRecord<N> {
    /// Returns the node this record is scoped to.
    #[inline]
    pub fn target(&self) -> &N {
        match self {
            MutationRecord::ChildList { target, .. } => target,
            MutationRecord::Attributes { target, .. } => target,
        }
    }

    /// Returns true for child-list records.
    #[inline]
    pub fn is_child_list(&self) -> bool {
        matches!(self, MutationRecord::ChildList { .. })
    }
}

/// Which changes a watch receives, mirroring `MutationObserverInit`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserveInit {
    pub child_list: bool,
    pub attributes: bool,
    pub attribute_old_value: bool,
    pub subtree: bool,
}

impl ObserveInit {
    /// Child list, attributes with old values, whole subtree.
    pub const fn everything() -> Self {
        Self {
            child_list: true,
            attributes: true,
            attribute_old_value: true,
            subtree: true,
        }
    }

    /// Child list changes anywhere in the subtree.
    pub const fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            attributes: false,
            attribute_old_value: false,
            subtree: true,
        }
    }

    /// Returns true if this init would produce any records at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.child_list && !self.attributes
    }

    /// Returns true if a record of this kind should be queued.
    #[inline]
    pub fn accepts<N>(&self, record: &MutationRecord<N>) -> bool {
        match record {
            MutationRecord::ChildList { .. } => self.child_list,
            MutationRecord::Attributes { .. } => self.attributes,
        }
    }
}
