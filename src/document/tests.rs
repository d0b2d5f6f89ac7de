use super::*;

#[test]
fn test_map_put_get_and_replace() {
    let map = Element::map();
    assert!(map.put("a", Element::int(1)).is_none());
    assert_eq!(map.get("a").and_then(|e| e.as_int()), Some(1));

    let replaced = map.put("a", Element::int(2));
    assert_eq!(replaced.and_then(|e| e.as_int()), Some(1));
    assert_eq!(map.get("a").and_then(|e| e.as_int()), Some(2));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_parent_links_follow_ownership() {
    let map = Element::map();
    let child = Element::string("hello");
    map.put("greeting", child.clone());
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&map)));

    let removed = map.remove("greeting");
    assert!(removed.is_some());
    assert!(child.parent().is_none());
}

#[test]
fn test_reinsert_same_element_keeps_parent() {
    let map = Element::map();
    let child = Element::int(1);
    map.put("a", child.clone());
    map.put("a", child.clone());
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&map)));

    let list = Element::list();
    let item = Element::int(2);
    list.add(item.clone());
    list.set(0, item.clone());
    assert!(item.parent().is_some_and(|p| p.ptr_eq(&list)));
}

#[test]
fn test_enclosing_map_skips_lists() {
    let map = Element::map();
    let list = Element::list();
    let leaf = Element::int(7);
    list.add(leaf.clone());
    map.put("xs", list);
    assert!(leaf.enclosing_map().is_some_and(|m| m.ptr_eq(&map)));
    assert!(map.enclosing_map().is_none());
}

#[test]
fn test_list_index_from_end() {
    let list = Element::list();
    for i in 0..5 {
        list.add(Element::int(i));
    }
    assert_eq!(list.item(Index::from_end(1)).and_then(|e| e.as_int()), Some(4));
    assert_eq!(list.item(Index::new(0)).and_then(|e| e.as_int()), Some(0));
    assert!(list.item(Index::from_end(6)).is_none());
}

#[test]
fn test_structural_equality_ignores_trivia_and_order() {
    let a = Element::map();
    a.put("x", Element::int(1));
    a.put("y", Element::boolean(true));
    a.set_comment("documented");

    let b = Element::map();
    b.put("y", Element::boolean(true));
    b.put("x", Element::int(1));

    assert_eq!(a, b);

    b.put("x", Element::int(2));
    assert_ne!(a, b);
}

#[test]
fn test_typed_maps_compare_type_names() {
    let a = Element::typed_map("Server");
    let b = Element::typed_map("Server");
    let c = Element::map();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_copy_is_independent() {
    let map = Element::map();
    let inner = Element::map();
    inner.put("n", Element::int(1));
    map.put("inner", inner);

    let copy = map.copy();
    assert_eq!(map, copy);
    assert!(!map.ptr_eq(&copy));

    copy.get("inner").unwrap().put("n", Element::int(99));
    assert_ne!(map, copy);
    assert_eq!(
        map.get("inner").and_then(|m| m.get("n")).and_then(|e| e.as_int()),
        Some(1)
    );
}

#[test]
fn test_copy_re_resolves_references() {
    let root = Element::map();
    root.put("origin", Element::string("here"));
    let reference = Element::reference(vec!["origin".into()], false);
    root.put("alias", reference.clone());
    let doc = Document::new(root.clone());
    doc.resolve().unwrap();
    assert!(reference.is_resolved());

    let copy = root.copy();
    let alias = copy.get("alias").unwrap();
    assert!(alias.is_resolved());
    // The copy's reference resolves within the copy, not back into the
    // source tree.
    let target = alias.target().unwrap();
    assert!(target.ptr_eq(&copy.get("origin").unwrap()));
}

#[test]
fn test_scalar_accessors() {
    assert_eq!(Element::int(42).as_int(), Some(42));
    assert_eq!(Element::double(1.5).as_double(), Some(1.5));
    assert_eq!(Element::boolean(false).as_bool(), Some(false));
    assert_eq!(Element::string("s").as_string(), Some("s".to_string()));
    assert!(Element::null().is_null());
    assert_eq!(Element::int(42).as_double(), None);
}

#[test]
fn test_list_set_and_remove() {
    let list = Element::list();
    list.add(Element::int(1));
    list.add(Element::int(2));

    let old = list.set(0, Element::int(10));
    assert_eq!(old.and_then(|e| e.as_int()), Some(1));
    assert!(list.set(9, Element::int(0)).is_none());

    let removed = list.remove_item(1);
    assert_eq!(removed.and_then(|e| e.as_int()), Some(2));
    assert_eq!(list.len(), 1);
}
