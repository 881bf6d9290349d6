// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The declarative element model.
//!
//! An [`Element`] is an immutable description of one node: either a host node
//! (named tag or text) or a component (a function evaluated to produce more
//! elements). Elements are plain values; constructing them performs no host
//! work. Props are shared behind `Rc`, so cloning an element is cheap and a
//! committed fiber can hold the exact props it was rendered with.
//!
//! Event handlers live in the ordinary attribute map under keys starting with
//! `"on"` (`"onClick"` binds the `click` event). Handler and component identity
//! is pointer identity: two handlers compare equal only if they are clones of
//! the same `Rc`, which is what lets the prop diff skip unchanged bindings.

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::hooks::Hooks;

/// Attribute key under which a [`HostTag::Text`] node carries its content.
///
/// Text updates flow through the regular prop-diff path like any other
/// attribute.
pub const TEXT_ATTR: &str = "text";

/// Whether an attribute key names an event binding rather than a plain
/// attribute.
pub(crate) fn is_event_key(key: &str) -> bool {
    key.starts_with("on")
}

/// Event name for an `"on"`-prefixed attribute key (`"onClick"` → `"click"`).
pub(crate) fn event_name(key: &str) -> String {
    key[2..].to_lowercase()
}

// ---------------------------------------------------------------------------
// Event handlers
// ---------------------------------------------------------------------------

/// A shared event callback.
///
/// Equality is `Rc` pointer identity. A handler closure rebuilt on every
/// render therefore never compares equal to its predecessor and is re-bound on
/// each commit; use [`Hooks::use_callback`] to keep one identity across
/// renders.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    /// Wraps a callback.
    #[must_use]
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the callback.
    pub fn invoke(&self) {
        (self.0)();
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Prop values
// ---------------------------------------------------------------------------

/// A single attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A string value.
    Text(String),
    /// A signed integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An event callback (only meaningful under an `"on"`-prefixed key).
    Handler(EventHandler),
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<EventHandler> for PropValue {
    fn from(v: EventHandler) -> Self {
        Self::Handler(v)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// Attributes and children of an element.
///
/// `attrs` is ordered (`BTreeMap`) so the prop diff visits keys
/// deterministically. The builder methods consume and return `self`:
///
/// ```
/// use weft_core::{Element, Props};
///
/// let el = Element::host(
///     "div",
///     Props::new()
///         .attr("class", "panel")
///         .child(Element::text("hello")),
/// );
/// assert_eq!(el.props.children.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    /// Attribute map, event bindings included.
    pub attrs: BTreeMap<String, PropValue>,
    /// Child elements, in order.
    pub children: Vec<Element>,
}

impl Props {
    /// Creates empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Binds an event handler. `on("click", h)` stores the handler under the
    /// `"onclick"` key.
    #[must_use]
    pub fn on(mut self, event: &str, handler: EventHandler) -> Self {
        let mut key = String::from("on");
        key.push_str(event);
        self.attrs.insert(key, PropValue::Handler(handler));
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child if present; `None` is dropped without a placeholder.
    #[must_use]
    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(child) = child {
            self.children.push(child);
        }
        self
    }

    /// Appends a flat run of children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// A component function.
///
/// Evaluated with a [`Hooks`] context and its props, it returns the single
/// element it renders to. Identity is pointer identity: the reconciler pairs a
/// fiber with a new element of the same component only if both hold clones of
/// the same `Rc`, so define each component once and clone the handle.
#[derive(Clone)]
pub struct Component(Rc<dyn Fn(&mut Hooks<'_>, &Props) -> Element>);

impl Component {
    /// Wraps a component function.
    #[must_use]
    pub fn new(f: impl Fn(&mut Hooks<'_>, &Props) -> Element + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Whether two handles refer to the same function.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, cx: &mut Hooks<'_>, props: &Props) -> Element {
        (self.0)(cx, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:p})", Rc::as_ptr(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// The tag of a host element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostTag {
    /// A named node (`"div"`, `"button"`, ...). Names are opaque to the
    /// engine; the backend interprets them.
    Named(Cow<'static, str>),
    /// A text node. Content lives under the [`TEXT_ATTR`] attribute.
    Text,
}

impl fmt::Display for HostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Text => write!(f, "#text"),
        }
    }
}

/// What an element describes.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// A host node the backend materializes directly.
    Host(HostTag),
    /// A component function evaluated during reconciliation.
    Component(Component),
}

/// One node of a declarative tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Host tag or component function.
    pub kind: ElementKind,
    /// Shared attributes and children.
    pub props: Rc<Props>,
}

impl Element {
    /// A host element with the given tag name.
    #[must_use]
    pub fn host(tag: impl Into<Cow<'static, str>>, props: Props) -> Self {
        Self {
            kind: ElementKind::Host(HostTag::Named(tag.into())),
            props: Rc::new(props),
        }
    }

    /// A text element. The content is stored as the [`TEXT_ATTR`] attribute,
    /// so text changes diff like any other prop.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Host(HostTag::Text),
            props: Rc::new(Props::new().attr(TEXT_ATTR, content.into())),
        }
    }

    /// A component element.
    #[must_use]
    pub fn component(component: Component, props: Props) -> Self {
        Self {
            kind: ElementKind::Component(component),
            props: Rc::new(props),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_identity_is_pointer_identity() {
        let a = EventHandler::new(|| {});
        let b = a.clone();
        let c = EventHandler::new(|| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn component_identity_is_pointer_identity() {
        let f = Component::new(|_, _| Element::text("x"));
        let g = f.clone();
        let h = Component::new(|_, _| Element::text("x"));
        assert!(f.same(&g));
        assert!(!f.same(&h));
    }

    #[test]
    fn text_element_carries_text_attr() {
        let el = Element::text("hello");
        assert_eq!(el.kind, ElementKind::Host(HostTag::Text));
        assert_eq!(
            el.props.attrs.get(TEXT_ATTR),
            Some(&PropValue::from("hello"))
        );
    }

    #[test]
    fn child_opt_drops_none() {
        let props = Props::new()
            .child_opt(Some(Element::text("a")))
            .child_opt(None)
            .child(Element::text("b"));
        assert_eq!(props.children.len(), 2);
    }

    #[test]
    fn on_prefixes_the_key() {
        let props = Props::new().on("click", EventHandler::new(|| {}));
        assert!(props.attrs.contains_key("onclick"));
        assert!(is_event_key("onclick"));
        assert_eq!(event_name("onClick"), "click");
    }

    #[test]
    fn ordinary_attrs_are_not_events() {
        assert!(!is_event_key("class"));
        // The "on" prefix is the whole rule.
        assert!(is_event_key("once"));
    }
}
