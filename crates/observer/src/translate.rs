//! Mutation translation.
//!
//! Turns raw mutation batches into `MutationEvent`s per subscriber. Matching
//! is two-tier: the notified element itself first, then, only if the
//! subscriber's descent policy allows it, a scan of its subtree.

use crate::event::{Change, Descent, EventKind, MutationEvent};
use crate::subscription::Subscription;
use alloc::rc::Rc;
use alloc::vec::Vec;
use domwatch_core::{Dom, MutationRecord, Selector};

/// Elements reported for one notified element and one subscriber.
///
/// Returns `(element, descent)` pairs in document order:
/// - match-all: the element itself;
/// - direct match: the element itself, tagged `Descent::None`;
/// - otherwise the first (`Single`) or every (`All`) matching descendant.
pub fn collect_matches<D: Dom>(
    dom: &D,
    selector: Option<&Selector>,
    descent: Descent,
    element: &D::Node,
) -> Vec<(D::Node, Descent)> {
    let selector = match selector {
        Some(s) => s,
        None => return alloc::vec![(element.clone(), Descent::None)],
    };

    if dom.matches(element, selector) {
        return alloc::vec![(element.clone(), Descent::None)];
    }

    match descent {
        Descent::None => Vec::new(),
        Descent::Single => dom
            .query_selector(element, selector)
            .map(|found| alloc::vec![(found, Descent::Single)])
            .unwrap_or_default(),
        Descent::All => dom
            .query_selector_all(element, selector)
            .into_iter()
            .map(|found| (found, Descent::All))
            .collect(),
    }
}

/// Translates a batch for every subscriber without invoking handlers.
///
/// Events come out in dispatch order: records in batch order; within a
/// child-list record, added elements then removed elements; per element,
/// subscribers in registration order.
#[cfg(test)]
pub(crate) fn translate<D: Dom>(
    dom: &D,
    subscriptions: &[Rc<Subscription<D::Node>>],
    records: &[MutationRecord<D::Node>],
) -> Vec<(usize, MutationEvent<D::Node>)> {
    let mut out = Vec::new();
    visit(dom, subscriptions, records, |index, event| out.push((index, event)));
    out
}

/// Delivers a batch to `subscriptions`.
///
/// `subscriptions` is a snapshot taken by the caller, so handlers may
/// subscribe or unsubscribe while it runs; each subscription's active flag
/// is re-checked before every call.
pub(crate) fn dispatch<D: Dom>(
    dom: &D,
    subscriptions: &[Rc<Subscription<D::Node>>],
    records: &[MutationRecord<D::Node>],
) {
    visit(dom, subscriptions, records, |index, event| {
        subscriptions[index].notify(&event)
    });
}

fn visit<D, F>(
    dom: &D,
    subscriptions: &[Rc<Subscription<D::Node>>],
    records: &[MutationRecord<D::Node>],
    mut emit: F,
) where
    D: Dom,
    F: FnMut(usize, MutationEvent<D::Node>),
{
    for record in records {
        match record {
            MutationRecord::ChildList { added, removed, .. } => {
                for node in added {
                    fan_out(dom, subscriptions, node, &Change::Added, &mut emit);
                }
                for node in removed {
                    fan_out(dom, subscriptions, node, &Change::Removed, &mut emit);
                }
            }
            MutationRecord::Attributes {
                target,
                name,
                old_value,
            } => {
                let change = Change::AttributeChanged {
                    name: name.clone(),
                    old_value: old_value.clone(),
                };
                fan_out(dom, subscriptions, target, &change, &mut emit);
            }
        }
    }
}

fn fan_out<D, F>(
    dom: &D,
    subscriptions: &[Rc<Subscription<D::Node>>],
    element: &D::Node,
    change: &Change,
    emit: &mut F,
) where
    D: Dom,
    F: FnMut(usize, MutationEvent<D::Node>),
{
    if !dom.is_element(element) {
        return;
    }
    let kind: EventKind = change.kind();

    for (index, subscription) in subscriptions.iter().enumerate() {
        if !subscription.is_active() || !subscription.handles(kind) {
            continue;
        }
        let matches = collect_matches(
            dom,
            subscription.selector(),
            subscription.descent(kind),
            element,
        );
        for (node, descent) in matches {
            emit(index, MutationEvent::new(node, change.clone(), descent));
        }
    }
}
