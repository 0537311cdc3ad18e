//! Runtime values produced by the [evaluator](crate::eval).
//!
//! `Value` is a tagged union rather than a trait-object hierarchy: every kind the evaluator can
//! produce is a variant, and dispatch is a `match` instead of a vtable call. Errors are a first
//! class variant ([Value::Error]) rather than a Rust `Result`/panic, so they can flow through
//! ordinary evaluation and short-circuit it without unwinding.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash as StdHash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::ast::{Block, Identifier};
use crate::environment::Environment;

/// The kind of a [Value], used in type-mismatch and `ERROR:` messages (`INTEGER`, `BOOLEAN`,
/// ...). Kept separate from [Value] itself so error formatting never needs to destructure a
/// value it isn't otherwise interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Boolean,
    String,
    Null,
    ReturnValue,
    Error,
    Function,
    Builtin,
    Array,
    Hash,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "INTEGER",
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::String => "STRING",
            ValueKind::Null => "NULL",
            ValueKind::ReturnValue => "RETURN_VALUE",
            ValueKind::Error => "ERROR",
            ValueKind::Function => "FUNCTION",
            ValueKind::Builtin => "BUILTIN",
            ValueKind::Array => "ARRAY",
            ValueKind::Hash => "HASH",
        };
        write!(f, "{name}")
    }
}

/// A builtin function implementation: a plain Rust function taking the already-evaluated
/// arguments and returning a [Value] (ordinarily [Value::Error] on misuse).
pub type BuiltinFn = fn(&[Value]) -> Value;

#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Null,
    /// Wraps the value produced by a `return` statement so it can be told apart from an
    /// ordinary expression result while it propagates up through nested blocks.
    ReturnValue(Box<Value>),
    Error(Rc<str>),
    Function {
        parameters: Rc<[Identifier]>,
        body: Rc<Block>,
        env: Rc<RefCell<Environment>>,
    },
    Builtin(BuiltinFn),
    Array(Rc<Vec<Value>>),
    Hash(Rc<IndexMap<HashKey, (Value, Value)>>),
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::String(_) => ValueKind::String,
            Value::Null => ValueKind::Null,
            Value::ReturnValue(_) => ValueKind::ReturnValue,
            Value::Error(_) => ValueKind::Error,
            Value::Function { .. } => ValueKind::Function,
            Value::Builtin(_) => ValueKind::Builtin,
            Value::Array(_) => ValueKind::Array,
            Value::Hash(_) => ValueKind::Hash,
        }
    }

    /// Every value is truthy except `false` and `Null`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into().into())
    }

    /// The human-facing rendering used by the CLI/REPL and by `Hash`/`Array` elements nested
    /// inside another `inspect()` call.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::String(s) => s.to_string(),
            Value::Null => "null".to_string(),
            Value::ReturnValue(value) => value.inspect(),
            Value::Error(message) => format!("ERROR: {message}"),
            Value::Function { parameters, body, .. } => {
                let params: Vec<_> = parameters.iter().map(|p| p.to_string()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
            Value::Array(elements) => {
                let rendered: Vec<_> = elements.iter().map(Value::inspect).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Hash(pairs) => {
                let rendered: Vec<_> = pairs
                    .values()
                    .map(|(k, v)| format!("{}: {}", k.inspect(), v.inspect()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }

    /// Attempt to derive this value's [HashKey], for use as a `Hash` literal key or index.
    /// Only [ValueKind::Integer], [ValueKind::Boolean], and [ValueKind::String] are hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        let mut hasher = FxHasher::default();
        match self {
            Value::Integer(n) => {
                n.hash(&mut hasher);
                Some(HashKey {
                    kind: ValueKind::Integer,
                    hash: hasher.finish(),
                })
            }
            Value::Boolean(b) => {
                b.hash(&mut hasher);
                Some(HashKey {
                    kind: ValueKind::Boolean,
                    hash: hasher.finish(),
                })
            }
            Value::String(s) => {
                s.hash(&mut hasher);
                Some(HashKey {
                    kind: ValueKind::String,
                    hash: hasher.finish(),
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.inspect())
    }
}

/// The key type `Hash` values are indexed by: a value's [ValueKind] plus a stable hash of its
/// contents. Two keys compare equal iff both fields match, which is how `{1: "a"}[1]` and
/// `{true: "a"}[true]` stay distinct despite both hashing to small integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StdHash)]
pub struct HashKey {
    pub kind: ValueKind,
    pub hash: u64,
}

// HashKey is stored by value in every Hash entry's key slot; keep it cheap to copy.
static_assertions::assert_eq_size!(HashKey, (ValueKind, u64));

/// A value which can serve as a `Hash` key. Implemented for the subset of [Value] variants that
/// [Value::hash_key] accepts; kept as a trait so callers can write `T: Hashable` bounds instead
/// of re-deriving the variant list.
pub trait Hashable {
    fn hash_key(&self) -> Option<HashKey>;
}

impl Hashable for Value {
    fn hash_key(&self) -> Option<HashKey> {
        Value::hash_key(self)
    }
}
