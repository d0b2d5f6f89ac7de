//! Reference resolution.
//!
//! Every `Reference` element is resolved at most once: the resolver walks
//! the tree, follows each reference's path to the element it names, and
//! stores a weak link to the target. A missing target is a legitimate
//! terminal state (the reference stays unresolved and formats in raw path
//! form). A reference that reaches itself, one of its ancestors, or another
//! reference currently being resolved is a fatal cycle.

use crate::KnotError;
use crate::document::{Document, Element};

/// Resolve every reference in the document against its own root.
pub fn resolve(document: &Document) -> Result<(), KnotError> {
    let root = document.root();
    resolve_with_root(&root, &root)
}

/// Resolve every reference under `element`, treating `root` as the origin
/// of rooted paths. Used by deep copy, where relative references resolve
/// inside the copy but rooted ones still point into the source tree.
pub(crate) fn resolve_with_root(element: &Element, root: &Element) -> Result<(), KnotError> {
    let mut in_flight = Vec::new();
    resolve_tree(element, root, &mut in_flight)
}

fn resolve_tree(
    element: &Element,
    root: &Element,
    in_flight: &mut Vec<Element>,
) -> Result<(), KnotError> {
    if element.is_reference() {
        return resolve_reference(element, root, in_flight);
    }
    if element.is_map() {
        for (_, child) in element.entries() {
            resolve_tree(&child, root, in_flight)?;
        }
    } else if element.is_list() {
        for child in element.items() {
            resolve_tree(&child, root, in_flight)?;
        }
    }
    Ok(())
}

fn resolve_reference(
    reference: &Element,
    root: &Element,
    in_flight: &mut Vec<Element>,
) -> Result<(), KnotError> {
    if reference.is_resolved() {
        return Ok(());
    }
    if in_flight.iter().any(|r| r.ptr_eq(reference)) {
        return Err(cycle_error(reference));
    }
    in_flight.push(reference.clone());
    let result = resolve_path(reference, root, in_flight);
    in_flight.pop();
    result
}

fn resolve_path(
    reference: &Element,
    root: &Element,
    in_flight: &mut Vec<Element>,
) -> Result<(), KnotError> {
    let origin = if reference.rooted() {
        root.clone()
    } else {
        reference.enclosing_map().unwrap_or_else(|| reference.clone())
    };

    // A parentless reference resolves against itself; a reference is not a
    // map, so the walk stops before the first hop and the reference stays
    // unresolved.
    if origin.ptr_eq(reference) {
        return Ok(());
    }

    let path = reference.path();
    let mut components = path.as_slice();

    // A path may start with the name the origin map is stored under in its
    // own parent; that component names the origin, not a child of it.
    if let (Some(first), Some(owner)) = (components.first(), origin.enclosing_map()) {
        if owner.get(first).is_some_and(|named| named.ptr_eq(&origin)) {
            components = &components[1..];
        }
    }

    let mut current = origin;
    for component in components {
        // An intermediate reference is followed through its target.
        if current.is_reference() {
            resolve_reference(&current, root, in_flight)?;
            match current.target() {
                Some(target) => current = target,
                None => return Ok(()),
            }
        }
        if !current.is_map() {
            return Ok(());
        }
        match current.get(component) {
            Some(child) => current = child,
            None => return Ok(()),
        }
    }

    // A chain ending in another reference resolves through it but links to
    // the reference element itself.
    if current.is_reference() && !current.ptr_eq(reference) {
        resolve_reference(&current, root, in_flight)?;
    }

    if current.ptr_eq(reference) || is_ancestor_of(&current, reference) {
        return Err(cycle_error(reference));
    }

    reference.set_resolved(&current);
    Ok(())
}

fn is_ancestor_of(candidate: &Element, element: &Element) -> bool {
    let mut current = element.parent();
    while let Some(ancestor) = current {
        if ancestor.ptr_eq(candidate) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

fn cycle_error(reference: &Element) -> KnotError {
    let mut path = reference.path().join(":");
    if reference.rooted() {
        path.insert(0, ':');
    }
    KnotError::CyclicReference { path }
}

/// Replace every resolved reference with an independent deep copy of its
/// target, so that repeated references to one element never alias.
pub(crate) fn simplify(document: &Document) {
    simplify_element(&document.root());
}

/// Every copy is taken before any slot is overwritten: a replacement may
/// drop the last strong handle on an element that a later chain link still
/// needs to upgrade its weak target through.
fn simplify_element(element: &Element) {
    let mut plan = Vec::new();
    collect_replacements(element, &mut plan);
    for (slot, replacement) in plan {
        match slot {
            Slot::Entry(map, key) => {
                map.put(key, replacement);
            }
            Slot::Item(list, index) => {
                list.set(index, replacement);
            }
        }
    }
}

enum Slot {
    Entry(Element, String),
    Item(Element, usize),
}

fn collect_replacements(element: &Element, plan: &mut Vec<(Slot, Element)>) {
    if element.is_map() {
        for (key, child) in element.entries() {
            if let Some(replacement) = replacement_for(&child) {
                plan.push((Slot::Entry(element.clone(), key), replacement));
            } else {
                collect_replacements(&child, plan);
            }
        }
    } else if element.is_list() {
        for (index, child) in element.items().into_iter().enumerate() {
            if let Some(replacement) = replacement_for(&child) {
                plan.push((Slot::Item(element.clone(), index), replacement));
            } else {
                collect_replacements(&child, plan);
            }
        }
    }
}

fn replacement_for(child: &Element) -> Option<Element> {
    if !child.is_reference() || !child.is_resolved() {
        return None;
    }
    // Follow a chain of resolved references to the terminal element it
    // names; resolution has already rejected cycles, so the walk ends.
    let mut target = child.target()?;
    while target.is_reference() {
        if !target.is_resolved() {
            return None;
        }
        target = target.target()?;
    }
    let copy = target.copy();
    if !child.comment().is_empty() {
        copy.set_comment(child.comment());
    }
    copy.set_whitespace(child.whitespace());
    simplify_element(&copy);
    Some(copy)
}

#[cfg(test)]
mod tests {
    use crate::KnotError;
    use crate::parse;

    #[test]
    fn test_relative_reference_resolves_to_sibling() {
        let doc = parse("{ a = 1, b = :a }").unwrap();
        doc.resolve().unwrap();
        let b = doc.root().get("b").unwrap();
        assert!(b.is_resolved());
        assert_eq!(b.target().and_then(|t| t.as_int()), Some(1));
    }

    #[test]
    fn test_simplify_replaces_with_independent_copy() {
        let doc = parse("{ a = 1, b = :a }").unwrap();
        doc.resolve().unwrap();
        doc.simplify();

        let root = doc.root();
        let b = root.get("b").unwrap();
        assert!(b.is_value());
        assert_eq!(b.as_int(), Some(1));
        assert!(!b.ptr_eq(&root.get("a").unwrap()));

        root.put("b", crate::Element::int(99));
        assert_eq!(root.get("a").and_then(|a| a.as_int()), Some(1));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let doc = parse("{ a = :a }").unwrap();
        match doc.resolve() {
            Err(KnotError::CyclicReference { path }) => assert_eq!(path, ":a"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_mutual_references_are_a_cycle() {
        let doc = parse("{ a = :b, b = :a }").unwrap();
        assert!(matches!(
            doc.resolve(),
            Err(KnotError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_ancestor_reference_is_a_cycle() {
        let doc = parse("{ a = { b = :a } }").unwrap();
        assert!(matches!(
            doc.resolve(),
            Err(KnotError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_root_reference_stays_unresolved() {
        // A reference with no enclosing map has nothing to walk.
        for source in [":a", "a"] {
            let doc = parse(source).unwrap();
            doc.resolve().unwrap();
            let root = doc.root();
            assert!(root.is_reference());
            assert!(!root.is_resolved());
            assert!(root.target().is_none());
        }
    }

    #[test]
    fn test_missing_target_stays_unresolved() {
        let doc = parse("{ a = :nowhere }").unwrap();
        doc.resolve().unwrap();
        let a = doc.root().get("a").unwrap();
        assert!(!a.is_resolved());
        assert!(a.target().is_none());
    }

    #[test]
    fn test_nested_path_resolution() {
        let doc = parse("{ server = { port = 80 }, p = :server:port }").unwrap();
        doc.resolve().unwrap();
        let p = doc.root().get("p").unwrap();
        assert_eq!(p.target().and_then(|t| t.as_int()), Some(80));
    }

    #[test]
    fn test_reference_chain_resolves_through_intermediate() {
        let doc = parse("{ a = 5, b = :a, c = :b }").unwrap();
        doc.resolve().unwrap();
        let c = doc.root().get("c").unwrap();
        assert!(c.is_resolved());
        // c links to the reference element b, which in turn links to a.
        let b = c.target().unwrap();
        assert!(b.is_reference());
        assert_eq!(b.target().and_then(|t| t.as_int()), Some(5));
    }

    #[test]
    fn test_simplify_collapses_reference_chain() {
        let doc = parse("{ a = 1, b = :a, c = :b }").unwrap();
        doc.resolve().unwrap();
        doc.simplify();
        assert_eq!(doc.to_compact_text(), "{a=1,b=1,c=1}");
        let c = doc.root().get("c").unwrap();
        assert!(c.is_value());
        assert_eq!(c.as_int(), Some(1));
    }

    #[test]
    fn test_simplify_follows_chain_into_other_container() {
        let doc = parse("{ inner = { b = :a }, a = 1, c = :inner:b }").unwrap();
        doc.resolve().unwrap();
        doc.simplify();
        assert_eq!(doc.to_compact_text(), "{inner={b=1},a=1,c=1}");
    }

    #[test]
    fn test_own_name_first_hop_is_skipped() {
        let doc = parse("{ box = { size = 3, twin = box:size } }").unwrap();
        doc.resolve().unwrap();
        let twin = doc.root().get("box").unwrap().get("twin").unwrap();
        assert_eq!(twin.target().and_then(|t| t.as_int()), Some(3));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let doc = parse("{ a = 1, b = :a }").unwrap();
        doc.resolve().unwrap();
        let target = doc.root().get("b").unwrap().target().unwrap();
        doc.resolve().unwrap();
        let again = doc.root().get("b").unwrap().target().unwrap();
        assert!(target.ptr_eq(&again));
    }
}
