use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::KnotError;
use crate::formatter::{self, FormatStyle};
use crate::resolver;

mod index;

pub use index::{Index, Range};

/// Scalar payload of a `Value` element. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

enum Payload {
    Value(Scalar),
    List {
        children: Vec<Element>,
        trailing_comment: String,
    },
    Map {
        entries: IndexMap<String, Element>,
        type_name: Option<String>,
        trailing_comment: String,
    },
    Reference {
        path: Vec<String>,
        rooted: bool,
        resolved: bool,
        target: Weak<RefCell<Node>>,
    },
}

struct Node {
    comment: String,
    whitespace: String,
    parent: Weak<RefCell<Node>>,
    payload: Payload,
}

/// A node handle in the document tree.
///
/// `Element` is a cheap reference-counted handle: `clone()` aliases the same
/// node (identity preserved, compare with [`Element::ptr_eq`]), while
/// [`Element::copy`] produces a fully independent deep copy. Children are
/// owned exclusively by their container; the parent link is a `Weak`
/// back-reference maintained by `put`/`add`/`set`/`remove` and never owns
/// anything.
#[derive(Clone)]
pub struct Element {
    node: Rc<RefCell<Node>>,
}

impl Element {
    fn with_payload(payload: Payload) -> Self {
        Element {
            node: Rc::new(RefCell::new(Node {
                comment: String::new(),
                whitespace: String::new(),
                parent: Weak::new(),
                payload,
            })),
        }
    }

    // --- factories ---

    pub fn null() -> Self {
        Element::with_payload(Payload::Value(Scalar::Null))
    }

    pub fn boolean(value: bool) -> Self {
        Element::with_payload(Payload::Value(Scalar::Bool(value)))
    }

    pub fn int(value: i64) -> Self {
        Element::with_payload(Payload::Value(Scalar::Int(value)))
    }

    pub fn double(value: f64) -> Self {
        Element::with_payload(Payload::Value(Scalar::Double(value)))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Element::with_payload(Payload::Value(Scalar::String(value.into())))
    }

    pub fn value(scalar: Scalar) -> Self {
        Element::with_payload(Payload::Value(scalar))
    }

    pub fn list() -> Self {
        Element::with_payload(Payload::List {
            children: Vec::new(),
            trailing_comment: String::new(),
        })
    }

    pub fn map() -> Self {
        Element::with_payload(Payload::Map {
            entries: IndexMap::new(),
            type_name: None,
            trailing_comment: String::new(),
        })
    }

    pub fn typed_map(type_name: impl Into<String>) -> Self {
        let map = Element::map();
        map.set_type_name(Some(type_name.into()));
        map
    }

    pub fn reference(path: Vec<String>, rooted: bool) -> Self {
        Element::with_payload(Payload::Reference {
            path,
            rooted,
            resolved: false,
            target: Weak::new(),
        })
    }

    // --- identity, trivia, parentage ---

    /// Identity comparison: do both handles alias the same node?
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub fn comment(&self) -> String {
        self.node.borrow().comment.clone()
    }

    pub fn set_comment(&self, comment: impl Into<String>) {
        self.node.borrow_mut().comment = comment.into();
    }

    pub fn whitespace(&self) -> String {
        self.node.borrow().whitespace.clone()
    }

    pub fn set_whitespace(&self, whitespace: impl Into<String>) {
        self.node.borrow_mut().whitespace = whitespace.into();
    }

    /// The owning container, if this element has been inserted into one.
    pub fn parent(&self) -> Option<Element> {
        let parent = self.node.borrow().parent.upgrade()?;
        Some(Element { node: parent })
    }

    /// The nearest enclosing Map, walking the parent chain.
    pub fn enclosing_map(&self) -> Option<Element> {
        let mut current = self.parent();
        while let Some(candidate) = current {
            if candidate.is_map() {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }

    /// Topmost ancestor (the element itself when detached).
    pub fn root(&self) -> Element {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn set_parent(&self, parent: Option<&Element>) {
        self.node.borrow_mut().parent = match parent {
            Some(p) => Rc::downgrade(&p.node),
            None => Weak::new(),
        };
    }

    // --- variant predicates & scalar accessors ---

    pub fn is_value(&self) -> bool {
        matches!(self.node.borrow().payload, Payload::Value(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.node.borrow().payload, Payload::Value(Scalar::Null))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.node.borrow().payload, Payload::List { .. })
    }

    pub fn is_map(&self) -> bool {
        matches!(self.node.borrow().payload, Payload::Map { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.node.borrow().payload, Payload::Reference { .. })
    }

    pub fn scalar(&self) -> Option<Scalar> {
        match &self.node.borrow().payload {
            Payload::Value(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.node.borrow().payload {
            Payload::Value(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.node.borrow().payload {
            Payload::Value(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match &self.node.borrow().payload {
            Payload::Value(Scalar::Double(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match &self.node.borrow().payload {
            Payload::Value(Scalar::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    // --- map operations ---

    /// Insert under `key`, replacing any prior entry. The child's parent
    /// link is (re)set; a replaced child's parent link is cleared. Returns
    /// the replaced element.
    ///
    /// Panics when called on a non-map: structural misuse is a programming
    /// error, not a formatted diagnostic.
    pub fn put(&self, key: impl Into<String>, child: Element) -> Option<Element> {
        child.set_parent(Some(self));
        let prior = match &mut self.node.borrow_mut().payload {
            Payload::Map { entries, .. } => entries.insert(key.into(), child.clone()),
            _ => panic!("put() on a non-map element"),
        };
        if let Some(old) = &prior {
            // Re-inserting the same element must not undo its parent link.
            if !old.ptr_eq(&child) {
                old.set_parent(None);
            }
        }
        prior
    }

    pub fn get(&self, key: &str) -> Option<Element> {
        match &self.node.borrow().payload {
            Payload::Map { entries, .. } => entries.get(key).cloned(),
            _ => None,
        }
    }

    pub fn remove(&self, key: &str) -> Option<Element> {
        let removed = match &mut self.node.borrow_mut().payload {
            Payload::Map { entries, .. } => entries.shift_remove(key),
            _ => panic!("remove() on a non-map element"),
        };
        if let Some(old) = &removed {
            old.set_parent(None);
        }
        removed
    }

    pub fn keys(&self) -> Vec<String> {
        match &self.node.borrow().payload {
            Payload::Map { entries, .. } => entries.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn entries(&self) -> Vec<(String, Element)> {
        match &self.node.borrow().payload {
            Payload::Map { entries, .. } => {
                entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn type_name(&self) -> Option<String> {
        match &self.node.borrow().payload {
            Payload::Map { type_name, .. } => type_name.clone(),
            _ => None,
        }
    }

    pub fn set_type_name(&self, name: Option<String>) {
        if let Payload::Map { type_name, .. } = &mut self.node.borrow_mut().payload {
            *type_name = name;
        }
    }

    // --- list operations ---

    /// Append a child, taking ownership and setting its parent link.
    pub fn add(&self, child: Element) {
        child.set_parent(Some(self));
        match &mut self.node.borrow_mut().payload {
            Payload::List { children, .. } => children.push(child),
            _ => panic!("add() on a non-list element"),
        }
    }

    pub fn get_item(&self, index: usize) -> Option<Element> {
        match &self.node.borrow().payload {
            Payload::List { children, .. } => children.get(index).cloned(),
            _ => None,
        }
    }

    /// Positional access through an [`Index`] (supports from-end addressing).
    pub fn item(&self, index: Index) -> Option<Element> {
        let offset = index.offset(self.len())?;
        self.get_item(offset)
    }

    /// Replace the child at `index`, returning the old child.
    pub fn set(&self, index: usize, child: Element) -> Option<Element> {
        child.set_parent(Some(self));
        let prior = match &mut self.node.borrow_mut().payload {
            Payload::List { children, .. } => {
                if index >= children.len() {
                    return None;
                }
                Some(std::mem::replace(&mut children[index], child.clone()))
            }
            _ => panic!("set() on a non-list element"),
        };
        if let Some(old) = &prior {
            if !old.ptr_eq(&child) {
                old.set_parent(None);
            }
        }
        prior
    }

    pub fn remove_item(&self, index: usize) -> Option<Element> {
        let removed = match &mut self.node.borrow_mut().payload {
            Payload::List { children, .. } => {
                if index >= children.len() {
                    return None;
                }
                Some(children.remove(index))
            }
            _ => panic!("remove_item() on a non-list element"),
        };
        if let Some(old) = &removed {
            old.set_parent(None);
        }
        removed
    }

    pub fn items(&self) -> Vec<Element> {
        match &self.node.borrow().payload {
            Payload::List { children, .. } => children.clone(),
            _ => Vec::new(),
        }
    }

    /// Child count for containers, 0 for scalars and references.
    pub fn len(&self) -> usize {
        match &self.node.borrow().payload {
            Payload::List { children, .. } => children.len(),
            Payload::Map { entries, .. } => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Comment attached just before a container's closing bracket/brace.
    pub fn trailing_comment(&self) -> String {
        match &self.node.borrow().payload {
            Payload::List { trailing_comment, .. } => trailing_comment.clone(),
            Payload::Map { trailing_comment, .. } => trailing_comment.clone(),
            _ => String::new(),
        }
    }

    pub fn set_trailing_comment(&self, comment: impl Into<String>) {
        match &mut self.node.borrow_mut().payload {
            Payload::List { trailing_comment, .. } => *trailing_comment = comment.into(),
            Payload::Map { trailing_comment, .. } => *trailing_comment = comment.into(),
            _ => {}
        }
    }

    // --- reference operations ---

    pub fn path(&self) -> Vec<String> {
        match &self.node.borrow().payload {
            Payload::Reference { path, .. } => path.clone(),
            _ => Vec::new(),
        }
    }

    pub fn rooted(&self) -> bool {
        match &self.node.borrow().payload {
            Payload::Reference { rooted, .. } => *rooted,
            _ => false,
        }
    }

    /// Resolution state. Once true it is final; re-resolution is a no-op.
    pub fn is_resolved(&self) -> bool {
        match &self.node.borrow().payload {
            Payload::Reference { resolved, .. } => *resolved,
            _ => false,
        }
    }

    pub fn target(&self) -> Option<Element> {
        match &self.node.borrow().payload {
            Payload::Reference { target, .. } => {
                target.upgrade().map(|node| Element { node })
            }
            _ => None,
        }
    }

    pub(crate) fn set_resolved(&self, element: &Element) {
        if let Payload::Reference { resolved, target, .. } = &mut self.node.borrow_mut().payload {
            *resolved = true;
            *target = Rc::downgrade(&element.node);
        }
    }

    // --- copying ---

    /// Deep copy: a structurally identical, fully independent tree with no
    /// shared ownership. References in the copy are re-resolved against the
    /// original's root, since their targets may live in the source tree.
    pub fn copy(&self) -> Element {
        let copy = self.deep_clone();
        // References the copy cannot resolve stay in the unresolved state.
        let _ = resolver::resolve_with_root(&copy, &self.root());
        copy
    }

    fn deep_clone(&self) -> Element {
        let node = self.node.borrow();
        let copy = match &node.payload {
            Payload::Value(scalar) => Element::value(scalar.clone()),
            Payload::List { children, trailing_comment } => {
                let list = Element::list();
                for child in children {
                    list.add(child.deep_clone());
                }
                list.set_trailing_comment(trailing_comment.clone());
                list
            }
            Payload::Map { entries, type_name, trailing_comment } => {
                let map = Element::map();
                map.set_type_name(type_name.clone());
                for (key, child) in entries {
                    map.put(key.clone(), child.deep_clone());
                }
                map.set_trailing_comment(trailing_comment.clone());
                map
            }
            Payload::Reference { path, rooted, .. } => {
                // Resolution state deliberately reset; copy() re-resolves.
                Element::reference(path.clone(), *rooted)
            }
        };
        copy.set_comment(node.comment.clone());
        copy.set_whitespace(node.whitespace.clone());
        copy
    }

    // --- formatting ---

    pub fn to_text(&self, style: &FormatStyle) -> String {
        formatter::format_element(self, style)
    }
}

/// Structural equality: payload-deep, ignoring comments, whitespace, parent
/// links and resolution state. Map comparison is key-set based (storage
/// order is insignificant).
impl PartialEq for Element {
    fn eq(&self, other: &Element) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (&self.node.borrow().payload, &other.node.borrow().payload) {
            (Payload::Value(a), Payload::Value(b)) => a == b,
            (
                Payload::List { children: a, .. },
                Payload::List { children: b, .. },
            ) => a == b,
            (
                Payload::Map { entries: a, type_name: ta, .. },
                Payload::Map { entries: b, type_name: tb, .. },
            ) => {
                ta == tb
                    && a.len() == b.len()
                    && a.iter().all(|(key, value)| b.get(key) == Some(value))
            }
            (
                Payload::Reference { path: a, rooted: ra, .. },
                Payload::Reference { path: b, rooted: rb, .. },
            ) => a == b && ra == rb,
            _ => false,
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node.borrow().payload {
            Payload::Value(scalar) => write!(f, "Value({:?})", scalar),
            Payload::List { children, .. } => f.debug_list().entries(children).finish(),
            Payload::Map { entries, type_name, .. } => {
                if let Some(name) = type_name {
                    write!(f, "{} ", name)?;
                }
                f.debug_map().entries(entries.iter()).finish()
            }
            Payload::Reference { path, rooted, resolved, .. } => write!(
                f,
                "Reference({}{}{})",
                if *rooted { ":" } else { "" },
                path.join(":"),
                if *resolved { ", resolved" } else { "" }
            ),
        }
    }
}

/// A parsed document: the root element plus a possible dangling comment
/// found after the last token.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    trailing_comment: Option<String>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Document { root, trailing_comment: None }
    }

    pub fn with_trailing_comment(root: Element, trailing_comment: Option<String>) -> Self {
        Document { root, trailing_comment }
    }

    pub fn root(&self) -> Element {
        self.root.clone()
    }

    pub fn trailing_comment(&self) -> Option<&str> {
        self.trailing_comment.as_deref()
    }

    /// Resolve every reference in the tree. Missing targets are left
    /// unresolved; cycles are fatal.
    pub fn resolve(&self) -> Result<(), KnotError> {
        resolver::resolve(self)
    }

    /// Replace every resolved reference with an independent copy of its
    /// target.
    pub fn simplify(&self) {
        resolver::simplify(self);
    }

    pub fn to_text(&self, style: &FormatStyle) -> String {
        formatter::format_document(self, style)
    }

    pub fn to_compact_text(&self) -> String {
        self.to_text(&FormatStyle::compact())
    }

    pub fn to_nice_text(&self) -> String {
        self.to_text(&FormatStyle::nice())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Document) -> bool {
        self.root == other.root
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_nice_text())
    }
}

#[cfg(test)]
mod tests;
