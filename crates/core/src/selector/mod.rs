//! CSS selectors.
//!
//! `Selector` is the validated selector string handed to hosts. Hosts that
//! match in Rust (the in-memory document) parse it into a `SelectorList`
//! and match it against any type implementing `SelectorElement`.
//!
//! Supported syntax:
//! - `div`, `*` - type and universal selectors (case-insensitive)
//! - `#id`, `.class` - id and class selectors
//! - `[attr]`, `[attr=v]`, `[attr~=v]`, `[attr|=v]`, `[attr^=v]`,
//!   `[attr$=v]`, `[attr*=v]` - attribute selectors, values bare or quoted
//! - `a b`, `a > b`, `a + b`, `a ~ b` - combinators
//! - `a, b` - selector lists

mod parser;

pub use parser::{parse_selector_list, ParseError};

use crate::error::{Error, Result};
use crate::strings::is_blank;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A non-blank CSS selector.
///
/// Validation here only rejects blank input; syntax is checked by the host
/// (see `Dom::check_selector`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selector(String);

impl Selector {
    /// Creates a selector, rejecting empty or whitespace-only input.
    pub fn new(selector: impl Into<String>) -> Result<Self> {
        let selector = selector.into();
        if is_blank(&selector) {
            return Err(Error::configuration("Selector is blank"));
        }
        Ok(Self(selector))
    }

    /// Validates an optional selector where `None` means "match everything".
    pub fn optional(selector: Option<&str>) -> Result<Option<Self>> {
        selector.map(Selector::new).transpose()
    }

    /// Returns the selector text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the selector into a matchable list.
    pub fn parse(&self) -> Result<SelectorList> {
        parse_selector_list(&self.0)
            .map_err(|e| Error::invalid_selector(self.0.as_str(), e.message))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Relationship between two compound selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// How an attribute selector compares the attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// `[attr]`
    Exists,
    /// `[attr=v]`
    Equals(String),
    /// `[attr~=v]` - whitespace-separated word
    Includes(String),
    /// `[attr|=v]` - exactly `v` or `v-` prefix
    DashMatch(String),
    /// `[attr^=v]`
    Prefix(String),
    /// `[attr$=v]`
    Suffix(String),
    /// `[attr*=v]`
    Substring(String),
}

impl AttributeMatcher {
    /// Tests an attribute value against this matcher.
    pub fn matches_value(&self, value: &str) -> bool {
        match self {
            AttributeMatcher::Exists => true,
            AttributeMatcher::Equals(v) => value == v,
            AttributeMatcher::Includes(v) => {
                !v.is_empty()
                    && !v.contains(char::is_whitespace)
                    && value.split_ascii_whitespace().any(|word| word == v)
            }
            AttributeMatcher::DashMatch(v) => {
                value == v
                    || (value.len() > v.len()
                        && value.starts_with(v.as_str())
                        && value.as_bytes()[v.len()] == b'-')
            }
            // Empty operands never match for the substring family.
            AttributeMatcher::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttributeMatcher::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttributeMatcher::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
        }
    }
}

/// `[name <op> value]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Lowercased attribute name.
    pub name: String,
    pub matcher: AttributeMatcher,
}

/// A sequence of simple selectors with no combinator, e.g. `div#main.card`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// Lowercased type selector; `None` for `*` or when omitted.
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    /// Tests one element against this compound, ignoring combinators.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if !element.local_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if !self.ids.is_empty() {
            match element.attribute("id") {
                Some(id) => {
                    if !self.ids.iter().all(|want| want == id) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if !self.classes.is_empty() {
            let class_attr = match element.attribute("class") {
                Some(c) => c,
                None => return false,
            };
            let has_all = self
                .classes
                .iter()
                .all(|want| class_attr.split_ascii_whitespace().any(|c| c == want));
            if !has_all {
                return false;
            }
        }

        self.attributes.iter().all(|attr| {
            element
                .attribute(&attr.name)
                .map(|value| attr.matcher.matches_value(value))
                .unwrap_or(false)
        })
    }
}

/// Compound selectors joined by combinators, e.g. `ul > li.item a`.
///
/// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Tests an element, matching right to left.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(element, n - 1),
        }
    }

    fn matches_at<E: SelectorElement>(&self, element: &E, index: usize) -> bool {
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => element
                .parent_element()
                .map(|parent| self.matches_at(&parent, index - 1))
                .unwrap_or(false),
            Combinator::Descendant => {
                let mut current = element.parent_element();
                while let Some(ancestor) = current {
                    if self.matches_at(&ancestor, index - 1) {
                        return true;
                    }
                    current = ancestor.parent_element();
                }
                false
            }
            Combinator::NextSibling => element
                .previous_sibling_element()
                .map(|sibling| self.matches_at(&sibling, index - 1))
                .unwrap_or(false),
            Combinator::SubsequentSibling => {
                let mut current = element.previous_sibling_element();
                while let Some(sibling) = current {
                    if self.matches_at(&sibling, index - 1) {
                        return true;
                    }
                    current = sibling.previous_sibling_element();
                }
                false
            }
        }
    }
}

/// A comma-separated list of complex selectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Returns true if any selector in the list matches the element.
    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.selectors.iter().any(|s| s.matches(element))
    }
}

/// The view of an element that selector matching needs.
///
/// Implementations are usually a cheap `(tree, node)` pair.
pub trait SelectorElement: Sized {
    /// Tag name; compared ASCII case-insensitively.
    fn local_name(&self) -> &str;

    /// Attribute value by lowercased name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Parent, if it is an element (not the document).
    fn parent_element(&self) -> Option<Self>;

    /// Closest preceding sibling that is an element.
    fn previous_sibling_element(&self) -> Option<Self>;
}
