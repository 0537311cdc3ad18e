//! The tree-walking evaluator: `eval(node, env) -> Value`.
//!
//! Runtime errors are ordinary [Value::Error] values, not Rust errors - every match arm that can
//! fail checks `is_error()` on what it just evaluated and returns early with it unchanged. This
//! keeps the control flow a plain recursive-descent walk instead of a `Result`-threading exercise,
//! and lets `if (1 + true) { ... }` surface its error to a REPL exactly like any other value would.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Block, Expression, Program, Statement};
use crate::builtins;
use crate::environment::Environment;
use crate::value::{HashKey, Value};
use indexmap::IndexMap;

/// Evaluate a whole [Program], returning the value of its last statement (or [Value::Null] if it
/// has none). A top-level `return` unwraps immediately; a top-level error stops evaluation.
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
    let mut result = Value::Null;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        match result {
            Value::ReturnValue(value) => return *value,
            Value::Error(_) => return result,
            _ => {}
        }
    }

    result
}

fn eval_block(block: &Block, env: &Rc<RefCell<Environment>>) -> Value {
    let mut result = Value::Null;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Rc<RefCell<Environment>>) -> Value {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().set(name.value.clone(), value)
        }
        Statement::Return { value, .. } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            Value::ReturnValue(Box::new(value))
        }
        Statement::Expression { expression, .. } => eval_expression(expression, env),
        Statement::Block(block) => eval_block(block, env),
    }
}

fn eval_expression(expression: &Expression, env: &Rc<RefCell<Environment>>) -> Value {
    match expression {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::StringLiteral { value, .. } => Value::String(value.as_str().into()),
        Expression::Boolean { value, .. } => native_bool(*value),
        Expression::Identifier(ident) => eval_identifier(&ident.value, env),
        Expression::Prefix { operator, right, .. } => {
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => eval_if_expression(condition, consequence, alternative.as_ref(), env),
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Value::Function {
            parameters: parameters.clone().into(),
            body: Rc::new(body.clone()),
            env: Rc::clone(env),
        },
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            let function = eval_expression(function, env);
            if function.is_error() {
                return function;
            }

            let args = match eval_expressions(arguments, env) {
                Ok(args) => args,
                Err(err) => return err,
            };

            apply_function(function, args)
        }
        Expression::ArrayLiteral { elements, .. } => match eval_expressions(elements, env) {
            Ok(elements) => Value::Array(Rc::new(elements)),
            Err(err) => err,
        },
        Expression::HashLiteral { pairs, .. } => eval_hash_literal(pairs, env),
        Expression::Index { left, index, .. } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
    }
}

fn native_bool(value: bool) -> Value {
    if value {
        Value::TRUE
    } else {
        Value::FALSE
    }
}

fn eval_expressions(
    expressions: &[Expression],
    env: &Rc<RefCell<Environment>>,
) -> Result<Vec<Value>, Value> {
    let mut result = Vec::with_capacity(expressions.len());

    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_error() {
            return Err(value);
        }
        result.push(value);
    }

    Ok(result)
}

fn eval_identifier(name: &str, env: &Rc<RefCell<Environment>>) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }

    if let Some(builtin) = builtins::lookup(name) {
        return builtin;
    }

    Value::error(format!("identifier not found: {name}"))
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => native_bool(!right.is_truthy()),
        "-" => match right {
            Value::Integer(n) => Value::Integer(-n),
            other => Value::error(format!("unknown operator: -{}", other.kind())),
        },
        _ => Value::error(format!("unknown operator: {operator}{}", right.kind())),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        _ if operator == "==" => native_bool(values_equal(&left, &right)),
        _ if operator == "!=" => native_bool(!values_equal(&left, &right)),
        _ if left.kind() != right.kind() => Value::error(format!(
            "type mismatch: {} {operator} {}",
            left.kind(),
            right.kind()
        )),
        (Value::String(l), Value::String(r)) => eval_string_infix_expression(operator, l, r),
        _ => Value::error(format!(
            "unknown operator: {} {operator} {}",
            left.kind(),
            right.kind()
        )),
    }
}

/// Value equality for the kinds that support it, and identity (trivially true, since both sides
/// are the same canonical singleton) for booleans. Functions, arrays, and hashes are never equal
/// to anything but themselves by this definition unless they happen to structurally match, which
/// mirrors the book's `==`/`!=` behaving like pointer comparison for non-primitive types.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left + right),
        "-" => Value::Integer(left - right),
        "*" => Value::Integer(left * right),
        "/" => Value::Integer(left / right),
        "<" => native_bool(left < right),
        ">" => native_bool(left > right),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Value::error(format!("unknown operator: INTEGER {operator} INTEGER")),
    }
}

fn eval_string_infix_expression(operator: &str, left: &Rc<str>, right: &Rc<str>) -> Value {
    if operator != "+" {
        return Value::error(format!("unknown operator: STRING {operator} STRING"));
    }

    Value::String(format!("{left}{right}").into())
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &Block,
    alternative: Option<&Block>,
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let condition = eval_expression(condition, env);
    if condition.is_error() {
        return condition;
    }

    if condition.is_truthy() {
        eval_block(consequence, env)
    } else if let Some(alternative) = alternative {
        eval_block(alternative, env)
    } else {
        Value::Null
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Rc<RefCell<Environment>>) -> Value {
    let mut result = IndexMap::with_capacity(pairs.len());

    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env);
        if key.is_error() {
            return key;
        }

        let Some(hash_key) = key.hash_key() else {
            return Value::error(format!("unusable as hash key: {}", key.kind()));
        };

        let value = eval_expression(value_expr, env);
        if value.is_error() {
            return value;
        }

        result.insert(hash_key, (key, value));
    }

    Value::Hash(Rc::new(result))
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => eval_array_index(elements, *i),
        (Value::Hash(pairs), _) => eval_hash_index(pairs, index),
        _ => Value::error(format!("index operator not supported: {}", left.kind())),
    }
}

fn eval_array_index(elements: &[Value], index: i64) -> Value {
    if index < 0 || index as usize >= elements.len() {
        return Value::Null;
    }
    elements[index as usize].clone()
}

fn eval_hash_index(pairs: &IndexMap<HashKey, (Value, Value)>, index: Value) -> Value {
    let Some(hash_key) = index.hash_key() else {
        return Value::error(format!("unusable as hash key: {}", index.kind()));
    };

    match pairs.get(&hash_key) {
        Some((_, value)) => value.clone(),
        None => Value::Null,
    }
}

fn apply_function(function: Value, args: Vec<Value>) -> Value {
    match function {
        Value::Function {
            parameters,
            body,
            env,
        } => {
            let call_env = extend_function_env(&parameters, &env, args);
            let evaluated = eval_block(&body, &call_env);
            unwrap_return_value(evaluated)
        }
        Value::Builtin(builtin) => builtin(&args),
        other => Value::error(format!("not a function: {}", other.kind())),
    }
}

/// Binds each parameter to its argument in a scope enclosed by the function's captured
/// environment. Extra arguments are ignored and missing ones are left unbound (looking them up
/// inside the body then fails with `identifier not found`), matching a language with no arity
/// check at the call boundary.
fn extend_function_env(
    parameters: &[crate::ast::Identifier],
    captured: &Rc<RefCell<Environment>>,
    args: Vec<Value>,
) -> Rc<RefCell<Environment>> {
    let env = Environment::new_enclosed(Rc::clone(captured));

    for (param, arg) in parameters.iter().zip(args) {
        env.borrow_mut().set(param.value.clone(), arg);
    }

    env
}

fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval(input: &str) -> Value {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());
        eval_program(&program, &Environment::new())
    }

    #[test]
    fn integer_arithmetic() {
        let cases = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ];

        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Integer(n) if n == expected), "input was {input:?}");
        }
    }

    #[test]
    fn boolean_expressions() {
        let cases = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("true == true", true),
            ("true != false", true),
            ("(1 < 2) == true", true),
        ];

        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Boolean(b) if b == expected), "input was {input:?}");
        }
    }

    #[test]
    fn bang_operator() {
        let cases = [("!true", false), ("!false", true), ("!5", false), ("!!true", true)];
        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Boolean(b) if b == expected));
        }
    }

    #[test]
    fn if_else_expressions() {
        assert!(matches!(eval("if (true) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (false) { 10 }"), Value::Null));
        assert!(matches!(eval("if (1) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (1 < 2) { 10 } else { 20 }"), Value::Integer(10)));
        assert!(matches!(eval("if (1 > 2) { 10 } else { 20 }"), Value::Integer(20)));
    }

    #[test]
    fn return_statements_stop_evaluation_immediately() {
        let cases = [
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
                10,
            ),
        ];
        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Integer(n) if n == expected), "input was {input:?}");
        }
    }

    #[test]
    fn error_handling() {
        let cases = [
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            (r#""hello" - "world""#, "unknown operator: STRING - STRING"),
            ("{\"name\": \"Monkey\"}[fn(x) { x }];", "unusable as hash key: FUNCTION"),
        ];

        for (input, expected) in cases {
            match eval(input) {
                Value::Error(message) => assert_eq!(expected, &*message, "input was {input:?}"),
                other => panic!("expected an error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn let_statements() {
        let cases = [
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ];
        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Integer(n) if n == expected));
        }
    }

    #[test]
    fn function_application_and_closures() {
        assert!(matches!(
            eval("let identity = fn(x) { x; }; identity(5);"),
            Value::Integer(5)
        ));
        assert!(matches!(
            eval("let identity = fn(x) { return x; }; identity(5);"),
            Value::Integer(5)
        ));
        assert!(matches!(
            eval("let double = fn(x) { x * 2; }; double(5);"),
            Value::Integer(10)
        ));
        assert!(matches!(
            eval("let add = fn(x, y) { x + y; }; add(5, 5);"),
            Value::Integer(10)
        ));
        assert!(matches!(
            eval("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));"),
            Value::Integer(20)
        ));

        let newadder = r#"
            let newAdder = fn(x) {
                fn(y) { x + y };
            };
            let addTwo = newAdder(2);
            addTwo(2);
        "#;
        assert!(matches!(eval(newadder), Value::Integer(4)));
    }

    #[test]
    fn string_literals_and_concatenation() {
        assert!(matches!(eval(r#""Hello World!""#), Value::String(ref s) if &**s == "Hello World!"));
        assert!(matches!(
            eval(r#""Hello" + " " + "World!""#),
            Value::String(ref s) if &**s == "Hello World!"
        ));
    }

    #[test]
    fn builtin_len() {
        assert!(matches!(eval(r#"len("")"#), Value::Integer(0)));
        assert!(matches!(eval(r#"len("four")"#), Value::Integer(4)));
        assert!(matches!(eval(r#"len("hello world")"#), Value::Integer(11)));
        assert!(matches!(eval("len([1, 2, 3])"), Value::Integer(3)));

        match eval("len(1)") {
            Value::Error(message) => {
                assert_eq!("argument to `len` not supported, got INTEGER", &*message)
            }
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn array_literals_and_indexing() {
        assert!(matches!(
            eval("[1, 2 * 2, 3 + 3]"),
            Value::Array(ref elements) if elements.len() == 3
        ));
        assert!(matches!(eval("[1, 2, 3][0]"), Value::Integer(1)));
        assert!(matches!(eval("[1, 2, 3][1]"), Value::Integer(2)));
        assert!(matches!(eval("let i = 0; [1][i];"), Value::Integer(1)));
        assert!(matches!(eval("[1, 2, 3][3]"), Value::Null));
        assert!(matches!(eval("[1, 2, 3][-1]"), Value::Null));
    }

    #[test]
    fn hash_literals_and_indexing() {
        let input = r#"
            let two = "two";
            {
                "one": 10 - 9,
                two: 1 + 1,
                "thr" + "ee": 6 / 2,
                4: 4,
                true: 5,
                false: 6
            }
        "#;

        match eval(input) {
            Value::Hash(pairs) => assert_eq!(6, pairs.len()),
            other => panic!("expected a hash, got {other:?}"),
        }

        assert!(matches!(eval(r#"{"foo": 5}["foo"]"#), Value::Integer(5)));
        assert!(matches!(eval(r#"{"foo": 5}["bar"]"#), Value::Null));
        assert!(matches!(eval(r#"let key = "foo"; {"foo": 5}[key]"#), Value::Integer(5)));
        assert!(matches!(eval("{5: 5}[5]"), Value::Integer(5)));
        assert!(matches!(eval("{true: 5}[true]"), Value::Integer(5)));
        assert!(matches!(eval("{false: 5}[false]"), Value::Integer(5)));
    }

    #[test]
    fn builtin_array_helpers() {
        assert!(matches!(eval("first([1, 2, 3])"), Value::Integer(1)));
        assert!(matches!(eval("last([1, 2, 3])"), Value::Integer(3)));
        assert!(matches!(eval("first([])"), Value::Null));

        match eval("rest([1, 2, 3])") {
            Value::Array(elements) => {
                assert_eq!(2, elements.len());
                assert!(matches!(elements[0], Value::Integer(2)));
            }
            other => panic!("expected an array, got {other:?}"),
        }

        match eval("push([1, 2], 3)") {
            Value::Array(elements) => assert_eq!(3, elements.len()),
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn recursive_functions_close_over_themselves() {
        let input = r#"
            let counter = fn(x) {
                if (x > 100) {
                    return x;
                } else {
                    counter(x + 1);
                }
            };
            counter(0);
        "#;
        assert!(matches!(eval(input), Value::Integer(101)));
    }
}
