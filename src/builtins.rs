//! The fixed builtin-function table.
//!
//! Looked up only when identifier resolution misses the entire [Environment](crate::environment::Environment)
//! chain (see [crate::eval::eval_identifier]), so a user `let len = 5;` shadows `len` exactly like
//! shadowing any other name - the table is a fallback, not a reserved namespace.

use crate::value::Value;

/// Look up `name` in the builtin table, returning a ready-to-call [Value::Builtin] if it exists.
pub fn lookup(name: &str) -> Option<Value> {
    let handler: fn(&[Value]) -> Value = match name {
        "len" => len,
        "first" => first,
        "last" => last,
        "rest" => rest,
        "push" => push,
        _ => return None,
    };
    Some(Value::Builtin(handler))
}

fn wrong_arg_count(got: usize, want: usize) -> Value {
    Value::error(format!(
        "wrong number of arguments. got={got}, want={want}"
    ))
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Value::String(s) => Value::Integer(s.chars().count() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::error(format!(
            "argument to `len` not supported, got {}",
            other.kind()
        )),
    }
}

fn expect_array<'a>(name: &str, args: &'a [Value]) -> Result<&'a [Value], Value> {
    if args.len() != 1 {
        return Err(wrong_arg_count(args.len(), 1));
    }

    match &args[0] {
        Value::Array(elements) => Ok(elements.as_slice()),
        other => Err(Value::error(format!(
            "argument to `{name}` must be ARRAY, got {}",
            other.kind()
        ))),
    }
}

fn first(args: &[Value]) -> Value {
    match expect_array("first", args) {
        Ok(elements) => elements.first().cloned().unwrap_or(Value::Null),
        Err(err) => err,
    }
}

fn last(args: &[Value]) -> Value {
    match expect_array("last", args) {
        Ok(elements) => elements.last().cloned().unwrap_or(Value::Null),
        Err(err) => err,
    }
}

fn rest(args: &[Value]) -> Value {
    match expect_array("rest", args) {
        Ok(elements) if elements.is_empty() => Value::Null,
        Ok(elements) => Value::Array(std::rc::Rc::new(elements[1..].to_vec())),
        Err(err) => err,
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arg_count(args.len(), 2);
    }

    match &args[0] {
        Value::Array(elements) => {
            let mut new_elements = (**elements).clone();
            new_elements.push(args[1].clone());
            Value::Array(std::rc::Rc::new(new_elements))
        }
        other => Value::error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.kind()
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        match lookup(name).unwrap() {
            Value::Builtin(f) => f(args),
            _ => unreachable!(),
        }
    }

    #[test]
    fn len_of_string_and_array() {
        assert!(matches!(
            call("len", &[Value::String("hello world".into())]),
            Value::Integer(11)
        ));
        assert!(matches!(
            call(
                "len",
                &[Value::Array(std::rc::Rc::new(vec![Value::Integer(1), Value::Integer(2)]))]
            ),
            Value::Integer(2)
        ));
    }

    #[test]
    fn len_of_integer_is_an_error() {
        let result = call("len", &[Value::Integer(1)]);
        assert!(matches!(result, Value::Error(ref m) if &**m == "argument to `len` not supported, got INTEGER"));
    }

    #[test]
    fn len_wrong_arity() {
        let result = call("len", &[]);
        assert!(matches!(result, Value::Error(ref m) if &**m == "wrong number of arguments. got=0, want=1"));
    }

    #[test]
    fn first_last_rest_on_empty_array_are_null() {
        let empty = Value::Array(std::rc::Rc::new(vec![]));
        assert!(matches!(call("first", &[empty.clone()]), Value::Null));
        assert!(matches!(call("last", &[empty.clone()]), Value::Null));
        assert!(matches!(call("rest", &[empty]), Value::Null));
    }

    #[test]
    fn push_does_not_mutate_the_original_array() {
        let original = std::rc::Rc::new(vec![Value::Integer(1)]);
        let result = call("push", &[Value::Array(original.clone()), Value::Integer(2)]);
        assert_eq!(1, original.len());
        match result {
            Value::Array(elements) => assert_eq!(2, elements.len()),
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_is_not_a_builtin() {
        assert!(lookup("nonexistent").is_none());
    }
}
