use fron::{fron, stringify, FronMap, Number, Value};

#[test]
fn test_fron_macro_null_and_booleans() {
    assert_eq!(fron!(null), Value::Null);
    assert_eq!(fron!(true), Value::Bool(true));
    assert_eq!(fron!(false), Value::Bool(false));
}

#[test]
fn test_fron_macro_numbers() {
    assert_eq!(fron!(42), Value::Number(Number::Integer(42)));
    assert_eq!(fron!(3.5), Value::Number(Number::Float(3.5)));
    assert_eq!(fron!(-123), Value::Number(Number::Integer(-123)));
    assert_eq!(fron!((f64::NAN)), Value::Number(Number::NaN));
}

#[test]
fn test_fron_macro_strings() {
    assert_eq!(fron!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(fron!(""), Value::String(String::new()));
    assert_eq!(fron!((String::from("owned"))), Value::from("owned"));
}

#[test]
fn test_fron_macro_arrays() {
    assert_eq!(fron!([]), Value::array(vec![]));

    let mixed = fron!([1, "hello", true, null]);
    assert_eq!(
        mixed,
        Value::array(vec![
            Value::Number(Number::Integer(1)),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
        ])
    );
}

#[test]
fn test_fron_macro_objects() {
    assert_eq!(fron!({}), Value::object(FronMap::new()));

    let simple = fron!({
        "name": "Alice",
        "age": 30
    });
    let members = simple.as_object().unwrap().borrow();
    assert_eq!(members.len(), 2);
    assert_eq!(members.get("name"), Some(&Value::from("Alice")));
    assert_eq!(members.get("age"), Some(&Value::from(30)));
}

#[test]
fn test_fron_macro_nested() {
    let nested = fron!({
        "user": {
            "id": 123,
            "name": "Bob",
            "active": true
        },
        "tags": ["admin", "developer"],
        "count": 42
    });

    let user = nested.get("user").unwrap();
    assert_eq!(user.get("id"), Some(Value::from(123)));
    assert_eq!(user.get("active"), Some(Value::Bool(true)));

    let tags = nested.get("tags").unwrap();
    assert_eq!(tags.index(1), Some(Value::from("developer")));

    assert_eq!(
        stringify(&nested, false).unwrap(),
        r#"{user:{id:123,name:"Bob",active:true},tags:["admin","developer"],count:42}"#
    );
}

#[test]
fn test_fron_macro_shares_cloned_handles() {
    let shared = fron!({ "k": 1 });
    let doc = fron!([(shared.clone()), (shared)]);
    assert!(doc.index(0).unwrap().ptr_eq(&doc.index(1).unwrap()));
    assert_eq!(stringify(&doc, false).unwrap(), "[{k:1},Reference($[0])]");
}

#[test]
fn test_value_predicates() {
    let null_val = fron!(null);
    assert!(null_val.is_null());
    assert!(!null_val.is_bool());
    assert!(!null_val.is_number());
    assert!(!null_val.is_container());

    let str_val = fron!("hello");
    assert_eq!(str_val.as_str(), Some("hello"));

    let array_val = fron!([1, 2, 3]);
    assert!(array_val.is_container());
    assert_eq!(array_val.as_array().unwrap().borrow().len(), 3);

    let obj_val = fron!({ "key": "value" });
    assert!(obj_val.is_object());
    assert_eq!(obj_val.kind_name(), "object");
}
