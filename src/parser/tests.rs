use crate::document::Element;
use crate::error::KnotError;
use crate::lexer::TokenKind;
use crate::parse;

#[test]
fn test_empty_containers() {
    let map = parse("{}").unwrap();
    assert!(map.root().is_map());
    assert_eq!(map.root().len(), 0);

    let list = parse("[]").unwrap();
    assert!(list.root().is_list());
    assert_eq!(list.root().len(), 0);
}

#[test]
fn test_scalars_in_a_map() {
    let doc = parse(
        "{ n = null, b = true, i = -7, h = 0x1F, d = 2.5, s = \"hi\" }",
    )
    .unwrap();
    let root = doc.root();
    assert!(root.get("n").unwrap().is_null());
    assert_eq!(root.get("b").unwrap().as_bool(), Some(true));
    assert_eq!(root.get("i").unwrap().as_int(), Some(-7));
    assert_eq!(root.get("h").unwrap().as_int(), Some(31));
    assert_eq!(root.get("d").unwrap().as_double(), Some(2.5));
    assert_eq!(root.get("s").unwrap().as_string().as_deref(), Some("hi"));
}

#[test]
fn test_decimal_specials() {
    let doc = parse("[.NaN, .Inf, +.Inf, -.Inf, .5]").unwrap();
    let items = doc.root().items();
    assert!(items[0].as_double().is_some_and(f64::is_nan));
    assert_eq!(items[1].as_double(), Some(f64::INFINITY));
    assert_eq!(items[2].as_double(), Some(f64::INFINITY));
    assert_eq!(items[3].as_double(), Some(f64::NEG_INFINITY));
    assert_eq!(items[4].as_double(), Some(0.5));
}

#[test]
fn test_min_int_literal() {
    let doc = parse("[-9223372036854775808]").unwrap();
    assert_eq!(doc.root().get_item(0).unwrap().as_int(), Some(i64::MIN));
}

#[test]
fn test_trailing_commas_are_optional() {
    assert_eq!(parse("[1,]").unwrap(), parse("[1]").unwrap());
    assert_eq!(parse("{a=1,}").unwrap(), parse("{a=1}").unwrap());
}

#[test]
fn test_comma_elision_after_closing_bracket() {
    // No comma needed after an entry that ends with '}' or ']'.
    let doc = parse("{ a = { x = 1 } b = [1] c = 2 }").unwrap();
    assert_eq!(doc.root().len(), 3);
}

#[test]
fn test_missing_comma_between_scalars_is_an_error() {
    let err = parse("{ a = 1 b = 2 }").unwrap_err();
    match err {
        KnotError::UnexpectedToken { expected, .. } => {
            assert!(expected.contains(&TokenKind::Comma));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_typed_map() {
    let doc = parse("point{x=1,y=2}").unwrap();
    let root = doc.root();
    assert_eq!(root.type_name().as_deref(), Some("point"));
    assert_eq!(root.get("x").unwrap().as_int(), Some(1));
}

#[test]
fn test_colon_separator_and_quoted_keys() {
    let doc = parse("{ \"two words\": 1, plain: 2 }").unwrap();
    let root = doc.root();
    assert_eq!(root.get("two words").unwrap().as_int(), Some(1));
    assert_eq!(root.get("plain").unwrap().as_int(), Some(2));
}

#[test]
fn test_duplicate_keys_last_wins() {
    let doc = parse("{ a = 1, a = 2 }").unwrap();
    assert_eq!(doc.root().len(), 1);
    assert_eq!(doc.root().get("a").unwrap().as_int(), Some(2));
}

#[test]
fn test_rooted_and_relative_references() {
    let doc = parse("{ a = :x:y, b = x/y, c = sole }").unwrap();
    let root = doc.root();

    let a = root.get("a").unwrap();
    assert!(a.is_reference() && a.rooted());
    assert_eq!(a.path(), vec!["x", "y"]);

    let b = root.get("b").unwrap();
    assert!(b.is_reference() && !b.rooted());
    assert_eq!(b.path(), vec!["x", "y"]);

    let c = root.get("c").unwrap();
    assert!(c.is_reference() && !c.rooted());
    assert_eq!(c.path(), vec!["sole"]);
}

#[test]
fn test_reference_path_component_kinds() {
    let doc = parse("{ a = ..:\"odd key\":[1]:[0...^2]:leaf }").unwrap();
    let a = doc.root().get("a").unwrap();
    assert_eq!(a.path(), vec!["..", "odd key", "[1]", "[0...^2]", "leaf"]);
}

#[test]
fn test_open_ended_slice_components() {
    let doc = parse("{ a = xs:[..^1], b = xs:[2...] }").unwrap();
    let root = doc.root();
    assert_eq!(root.get("a").unwrap().path(), vec!["xs", "[0..^1]"]);
    assert_eq!(root.get("b").unwrap().path(), vec!["xs", "[2...^0]"]);
}

#[test]
fn test_dot_self_component() {
    let doc = parse("{ a = .:b }").unwrap();
    assert_eq!(doc.root().get("a").unwrap().path(), vec![".", "b"]);
}

#[test]
fn test_mixed_delimiters_are_an_error() {
    assert!(matches!(
        parse("{ a = x/:b }"),
        Err(KnotError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        parse("{ a = :x/y }"),
        Err(KnotError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_typed_map_beats_reference_disambiguation() {
    // `point{..}` is a typed map while `point` alone is a reference; both
    // decisions are made by lookahead without consuming anything.
    let doc = parse("{ a = point{x=1}, b = point }").unwrap();
    let root = doc.root();
    assert!(root.get("a").unwrap().is_map());
    assert!(root.get("b").unwrap().is_reference());
}

#[test]
fn test_string_value_vs_string_path_component() {
    let doc = parse("{ a = \"plain\", b = \"head\":tail }").unwrap();
    let root = doc.root();
    assert_eq!(root.get("a").unwrap().as_string().as_deref(), Some("plain"));
    assert_eq!(root.get("b").unwrap().path(), vec!["head", "tail"]);
}

#[test]
fn test_nested_structures() {
    let doc = parse("{ xs = [ { a = 1 }, [2, 3], point{p=4} ] }").unwrap();
    let xs = doc.root().get("xs").unwrap();
    assert_eq!(xs.len(), 3);
    assert_eq!(xs.get_item(0).unwrap().get("a").unwrap().as_int(), Some(1));
    assert_eq!(xs.get_item(1).unwrap().get_item(1).unwrap().as_int(), Some(3));
    assert_eq!(
        xs.get_item(2).unwrap().type_name().as_deref(),
        Some("point")
    );
}

#[test]
fn test_comments_attach_to_entries() {
    let doc = parse("{\n  # first\n  # second\n  a = 1\n}").unwrap();
    let a = doc.root().get("a").unwrap();
    assert_eq!(a.comment(), "first\nsecond");
}

#[test]
fn test_comment_on_quoted_key_entry() {
    let doc = parse("{\n  # spaced\n  \"two words\" = 1\n}").unwrap();
    let entry = doc.root().get("two words").unwrap();
    assert_eq!(entry.comment(), "spaced");
    assert_eq!(entry.as_int(), Some(1));
}

#[test]
fn test_blank_line_detaches_comment() {
    let doc = parse("{\n  # stale\n\n  a = 1\n}").unwrap();
    assert_eq!(doc.root().get("a").unwrap().comment(), "");
}

#[test]
fn test_trailing_container_and_document_comments() {
    let doc = parse("{ a = 1\n# closing note\n}\n# after everything").unwrap();
    assert_eq!(doc.root().trailing_comment(), "closing note");
    assert_eq!(doc.trailing_comment(), Some("after everything"));
}

#[test]
fn test_garbage_after_root_is_an_error() {
    let err = parse("{} {}").unwrap_err();
    match err {
        KnotError::UnexpectedToken { expected, .. } => {
            assert_eq!(expected, vec![TokenKind::End]);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_separator_is_an_error() {
    assert!(matches!(
        parse("{ a 1 }"),
        Err(KnotError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_unclosed_map_is_an_error() {
    assert!(parse("{ a = 1").is_err());
}

#[test]
fn test_reserved_words_as_keys() {
    let doc = parse("{ null = 1, integer = 2 }").unwrap();
    let root = doc.root();
    assert_eq!(root.get("null").unwrap().as_int(), Some(1));
    assert_eq!(root.get("integer").unwrap().as_int(), Some(2));
}

#[test]
fn test_keyword_reference_after_delimiter() {
    // A literal keyword opens a reference only when a delimiter follows.
    let doc = parse("{ a = true, b = true:inner }").unwrap();
    let root = doc.root();
    assert_eq!(root.get("a").unwrap().as_bool(), Some(true));
    assert_eq!(root.get("b").unwrap().path(), vec!["true", "inner"]);
}

#[test]
fn test_root_may_be_any_element() {
    assert_eq!(parse("42").unwrap().root().as_int(), Some(42));
    assert_eq!(
        parse(":a:b").unwrap().root().path(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn test_parse_errors_carry_positions() {
    let err = crate::parse_named("{ a = @ }", "conf.knot").unwrap_err();
    assert!(err.to_string().contains("conf.knot:1:7"));
}

#[test]
fn test_structural_equality_for_parsed_trees() {
    let built = Element::map();
    built.put("a", Element::int(1));
    let parsed = parse("{ a = 1 }").unwrap();
    assert_eq!(parsed.root(), built);
}
