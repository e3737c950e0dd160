/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Keys must be string literals. Anything that is not a nested array or
/// object literal goes through `Value::from`, so wrap longer expressions in
/// parentheses: `fron!([(a + b), (shared.clone())])`.
///
/// ```rust
/// use fron::{fron, stringify};
///
/// let tags = fron!(["a", "b"]);
/// let doc = fron!({ "tags": (tags.clone()), "again": (tags), "n": 1.5 });
/// assert_eq!(
///     stringify(&doc, false).unwrap(),
///     "{tags:[\"a\",\"b\"],again:Reference($.tags),n:1.5}"
/// );
/// ```
#[macro_export]
macro_rules! fron {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::array(vec![$($crate::fron!($elem)),*])
    };

    ({}) => {
        $crate::Value::object($crate::FronMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::FronMap::new();
        $(
            object.insert($key.to_string(), $crate::fron!($value));
        )*
        $crate::Value::object(object)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Number, Value};

    #[test]
    fn test_fron_macro_primitives() {
        assert_eq!(fron!(null), Value::Null);
        assert_eq!(fron!(true), Value::Bool(true));
        assert_eq!(fron!(false), Value::Bool(false));
        assert_eq!(fron!(42), Value::Number(Number::Integer(42)));
        assert_eq!(fron!(3.5), Value::Number(Number::Float(3.5)));
        assert_eq!(fron!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_fron_macro_arrays() {
        let arr = fron!([1, 2, 3]);
        let items = arr.as_array().unwrap().borrow();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2], Value::from(3));
        assert!(fron!([]).as_array().unwrap().borrow().is_empty());
    }

    #[test]
    fn test_fron_macro_objects() {
        let obj = fron!({
            "name": "Alice",
            "age": 30,
            "nested": { "ok": true }
        });
        assert_eq!(obj.get("name"), Some(Value::from("Alice")));
        assert_eq!(obj.get("age"), Some(Value::from(30)));
        assert_eq!(obj.get("nested").and_then(|n| n.get("ok")), Some(Value::Bool(true)));
    }

    #[test]
    fn test_each_literal_is_a_fresh_container() {
        let a = fron!([]);
        let b = fron!([]);
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }
}
