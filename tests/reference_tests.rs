use fron::{fron, parse, parse_token, stringify, Error, Value};

/// `abc` and `abc.prop2` are each reachable twice; nothing is cyclic.
fn regular_reference() -> Value {
    let doc = fron!({
        "abc": {
            "prop1": "Hello, World",
            "prop2": ["Hi, Ayon", ["Hello, World!"]]
        }
    });
    let abc = doc.get("abc").unwrap();
    let prop2 = abc.get("prop2").unwrap();
    doc.insert("def", abc.clone()).unwrap();
    doc.insert("ghi", prop2.clone()).unwrap();
    prop2.push(prop2.index(1).unwrap()).unwrap();
    doc
}

/// The root, `abc` and `abc.prop2` each contain themselves.
fn circular_reference() -> Value {
    let doc = fron!({
        "abc": {
            "prop1": "Hello, World",
            "prop2": ["Hi, Ayon"]
        }
    });
    let abc = doc.get("abc").unwrap();
    let prop2 = abc.get("prop2").unwrap();
    doc.insert("def", doc.clone()).unwrap();
    abc.insert("prop3", abc.clone()).unwrap();
    prop2.push(prop2.clone()).unwrap();
    doc
}

const REGULAR: &str = r#"{abc:{prop1:"Hello, World",prop2:["Hi, Ayon",["Hello, World!"],Reference($.abc.prop2[1])]},def:Reference($.abc),ghi:Reference($.abc.prop2)}"#;

const REGULAR_PRETTY: &str = r#"{
  abc: {
    prop1: "Hello, World",
    prop2: [
      "Hi, Ayon",
      [
        "Hello, World!"
      ],
      Reference($.abc.prop2[1])
    ]
  },
  def: Reference($.abc),
  ghi: Reference($.abc.prop2)
}"#;

const CIRCULAR: &str = r#"{abc:{prop1:"Hello, World",prop2:["Hi, Ayon",Reference($.abc.prop2)],prop3:Reference($.abc)},def:Reference($)}"#;

const CIRCULAR_PRETTY: &str = r#"{
  abc: {
    prop1: "Hello, World",
    prop2: [
      "Hi, Ayon",
      Reference($.abc.prop2)
    ],
    prop3: Reference($.abc)
  },
  def: Reference($)
}"#;

#[test]
fn test_stringify_regular_references() {
    let doc = regular_reference();
    assert_eq!(stringify(&doc, false).unwrap(), REGULAR);
    assert_eq!(stringify(&doc, true).unwrap(), REGULAR_PRETTY);
}

#[test]
fn test_stringify_circular_references() {
    let doc = circular_reference();
    assert_eq!(stringify(&doc, false).unwrap(), CIRCULAR);
    assert_eq!(stringify(&doc, true).unwrap(), CIRCULAR_PRETTY);
}

#[test]
fn test_parse_regular_references() {
    let doc = parse(REGULAR_PRETTY).unwrap();
    assert_eq!(doc, regular_reference());

    let abc = doc.get("abc").unwrap();
    let prop2 = abc.get("prop2").unwrap();
    assert!(doc.get("def").unwrap().ptr_eq(&abc));
    assert!(doc.get("ghi").unwrap().ptr_eq(&prop2));
    assert!(prop2.index(2).unwrap().ptr_eq(&prop2.index(1).unwrap()));
}

#[test]
fn test_parse_circular_references() {
    let doc = parse(CIRCULAR).unwrap();
    assert_eq!(doc, circular_reference());

    let abc = doc.get("abc").unwrap();
    let prop2 = abc.get("prop2").unwrap();
    assert!(doc.get("def").unwrap().ptr_eq(&doc));
    assert!(abc.get("prop3").unwrap().ptr_eq(&abc));
    assert!(prop2.index(1).unwrap().ptr_eq(&prop2));
}

#[test]
fn test_circular_round_trip_is_stable() {
    let text = stringify(&parse(CIRCULAR_PRETTY).unwrap(), false).unwrap();
    assert_eq!(text, CIRCULAR);
}

#[test]
fn test_parse_reference_compound_with_string_paths() {
    let text = r#"{
        abc: {
            prop1: "Hello, World",
            prop2: ["Hi, Ayon", ["Hello, World!"], Reference("abc.prop2[1]")]
        },
        def: Reference("abc"),
        ghi: Reference("$.abc.prop2")
    }"#;
    assert_eq!(parse(text).unwrap(), regular_reference());
}

#[test]
fn test_parse_reference_inside_wrappers() {
    let doc = parse(r#"Object({a: Object({c: Reference("a")}), b: 123})"#).unwrap();
    let a = doc.get("a").unwrap();
    assert!(a.get("c").unwrap().ptr_eq(&a));
    assert_eq!(stringify(&doc, false).unwrap(), "{a:{c:Reference($.a)},b:123}");
}

#[test]
fn test_bracketed_keys_in_references() {
    let doc = fron!({ "odd key": { "x": 1 } });
    doc.insert("alias", doc.get("odd key").unwrap()).unwrap();
    let text = stringify(&doc, false).unwrap();
    assert_eq!(text, r#"{"odd key":{x:1},alias:Reference($['odd key'])}"#);

    let back = parse(&text).unwrap();
    assert!(back.get("alias").unwrap().ptr_eq(&back.get("odd key").unwrap()));

    let double_quoted = parse(r#"{"odd key": [], b: $["odd key"], c: Reference('$[ "odd key" ]')}"#).unwrap();
    let target = double_quoted.get("odd key").unwrap();
    assert!(double_quoted.get("b").unwrap().ptr_eq(&target));
    assert!(double_quoted.get("c").unwrap().ptr_eq(&target));
}

#[test]
fn test_shared_compound_is_written_once() {
    let when = Value::date(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
    let doc = fron!({ "d": (when.clone()), "e": (when) });
    let text = stringify(&doc, false).unwrap();
    assert_eq!(text, r#"{d:Date("1970-01-01T00:00:00.000Z"),e:Reference($.d)}"#);

    let back = parse(&text).unwrap();
    assert!(back.get("e").unwrap().ptr_eq(&back.get("d").unwrap()));
}

#[test]
fn test_reference_into_compound_body() {
    let member = fron!({ "x": 1 });
    let doc = fron!({ "s": (Value::set(vec![member.clone()])), "r": (member) });
    let text = stringify(&doc, false).unwrap();
    assert_eq!(text, "{s:Set([{x:1}]),r:Reference($.s[0])}");

    let back = parse(&text).unwrap();
    let set = back.get("s").unwrap();
    let inside = set.as_compound().unwrap().borrow();
    match inside.instance() {
        fron::Instance::Set(items) => assert!(back.get("r").unwrap().ptr_eq(&items[0])),
        other => panic!("expected a set, got {other:?}"),
    }
}

#[test]
fn test_open_compound_that_contains_itself() {
    let doc = parse("{f: Foo({me: $.f})}").unwrap();
    let foo = doc.get("f").unwrap();
    let body = foo.as_compound().unwrap().borrow().record_body().cloned().unwrap();
    assert!(body.get("me").unwrap().ptr_eq(&foo));
    assert_eq!(stringify(&doc, false).unwrap(), "{f:Foo({me:Reference($.f)})}");
}

#[test]
fn test_shared_record_body_reads_back_as_compound() {
    let body = fron!({ "k": 1 });
    let doc = fron!([(Value::record("Foo", body.clone())), (body)]);
    let text = stringify(&doc, false).unwrap();
    assert_eq!(text, "[Foo({k:1}),Reference($[0])]");

    let back = parse(&text).unwrap();
    let second = back.index(1).unwrap();
    assert!(second.is_compound());
    assert!(second.ptr_eq(&back.index(0).unwrap()));
}

#[test]
fn test_back_reference_to_sibling_in_progress() {
    let doc = parse("[[1], $[0], [$[0]]]").unwrap();
    let first = doc.index(0).unwrap();
    assert!(doc.index(1).unwrap().ptr_eq(&first));
    assert!(doc.index(2).unwrap().index(0).unwrap().ptr_eq(&first));
}

#[test]
fn test_forward_reference_fails() {
    let err = parse("{a: $.b, b: 1}").unwrap_err();
    match err {
        Error::Reference { path, offset, .. } => {
            assert_eq!(path, "$.b");
            assert_eq!(offset, 4);
        }
        other => panic!("expected a reference error, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_reference_fails() {
    assert!(matches!(parse("[1, $[5]]").unwrap_err(), Error::Reference { .. }));
    assert!(matches!(
        parse("{a: 1, b: Reference($.a.b)}").unwrap_err(),
        Error::Reference { .. }
    ));
}

#[test]
fn test_parse_token_resolves_within_token() {
    let text = "let x = {a: [1], b: $.a};";
    let (value, consumed) = parse_token(text, 8).unwrap();
    assert_eq!(&text[8..8 + consumed], "{a: [1], b: $.a}");
    assert!(value.get("a").unwrap().ptr_eq(&value.get("b").unwrap()));
}

#[test]
fn test_omitted_elements_do_not_shift_paths() {
    let shared = fron!([]);
    let doc = fron!([(Value::Undefined), (shared.clone()), (shared)]);
    let text = stringify(&doc, false).unwrap();
    assert_eq!(text, "[[],Reference($[0])]");

    let back = parse(&text).unwrap();
    assert!(back.index(1).unwrap().ptr_eq(&back.index(0).unwrap()));
}
