//! Prop and Dependency Values
//!
//! Props, dependency sequences, and state cells all carry the same tagged
//! value type. Having one value type means the engine has exactly one
//! equality rule, used everywhere a cache or memo policy asks "did this
//! change?":
//!
//! - Primitives (null, bool, int, float, string) compare by value.
//! - Composites (lists) compare by reference identity (`Rc` pointer).
//! - Callbacks compare by reference identity of the underlying closure.
//!
//! Deep/structural equality is never applied implicitly. A freshly built
//! list with the same contents is a different value. Callers that want
//! stability across renders hold the value in `use_memo` or
//! `use_callback`.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// An ordered key → value mapping, as supplied by a parent to a child.
pub type Props = IndexMap<String, Value>;

/// An ordered dependency sequence, as declared by a cached computation.
pub type Deps = Vec<Value>;

/// A tagged value usable as a prop, a dependency, or state-cell contents.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Callback(CallbackRef),
}

impl Value {
    /// Build a string value.
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// Build a list value. The list compares by identity, not contents.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    /// The engine's single shallow equality rule.
    ///
    /// Floats compare by bit pattern so that a NaN written back unchanged
    /// does not defeat every cache downstream of it.
    pub fn shallow_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Integer accessor, for callers that know the expected shape.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// String accessor.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Callback accessor.
    pub fn as_callback(&self) -> Option<&CallbackRef> {
        match self {
            Value::Callback(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Equality delegates to [`Value::shallow_eq`]; there is deliberately
    /// no structural comparison.
    fn eq(&self, other: &Self) -> bool {
        self.shallow_eq(other)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::str(v)
    }
}

impl From<CallbackRef> for Value {
    fn from(v: CallbackRef) -> Self {
        Value::Callback(v)
    }
}

/// An opaque, invocable handle with stable identity.
///
/// Two `CallbackRef`s are equal iff they point at the same underlying
/// closure. [`crate::reactive::RenderContext::use_callback`] returns the
/// same handle across renders while its dependencies are unchanged, which
/// is the property memoized children rely on.
#[derive(Clone)]
pub struct CallbackRef(Rc<dyn Fn()>);

impl CallbackRef {
    /// Wrap a closure in a stable handle.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.0)();
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &CallbackRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for CallbackRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for CallbackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackRef({:p})", Rc::as_ptr(&self.0))
    }
}

/// Element-wise shallow equality of two dependency sequences.
///
/// An empty sequence compares equal only to another empty sequence, which
/// gives `use_memo(key, vec![], ..)` its "compute exactly once, forever"
/// behavior.
pub fn deps_equal(prev: &[Value], next: &[Value]) -> bool {
    prev.len() == next.len()
        && prev
            .iter()
            .zip(next.iter())
            .all(|(a, b)| a.shallow_eq(b))
}

/// Key-by-key shallow equality of two prop maps.
///
/// Any key added, removed, or changed is a difference. Key order is not
/// significant for comparison.
pub fn props_equal(prev: &Props, next: &Props) -> bool {
    prev.len() == next.len()
        && prev.iter().all(|(key, a)| {
            next.get(key).map(|b| a.shallow_eq(b)).unwrap_or(false)
        })
}

/// Build a [`Props`] map from `key => value` pairs.
///
/// ```rust
/// use weft_core::{props, Value};
///
/// let p = props! { "count" => 3, "label" => "items" };
/// assert_eq!(p.get("count"), Some(&Value::Int(3)));
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::value::Props::new() };
    ($($key:expr => $val:expr),+ $(,)?) => {{
        let mut map = $crate::value::Props::new();
        $( map.insert(($key).to_string(), $crate::value::Value::from($val)); )+
        map
    }};
}
