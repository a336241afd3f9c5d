use crate::ast::node::FunctionDef;
use crate::environment::ScopeRef;
use crate::error::RuntimeError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::rc::Rc;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Lists are shared: every binding of the same list sees its mutations.
pub type List = Rc<RefCell<Vec<Value>>>;

/// Insertion-ordered key/value pairs, looked up by equality.
pub type Dict = Rc<RefCell<Vec<(Value, Value)>>>;

/// A user-defined function. In lexical mode it carries the scope it was
/// defined in.
#[derive(Clone)]
pub struct Function {
    definition: Rc<FunctionDef>,
    closure: Option<ScopeRef>,
}

impl Function {
    pub(crate) fn new(
        definition: Rc<FunctionDef>,
        closure: Option<ScopeRef>,
    ) -> Self {
        Self {
            definition,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub(crate) fn definition(&self) -> &FunctionDef {
        &self.definition
    }

    pub(crate) fn closure(&self) -> Option<&ScopeRef> {
        self.closure.as_ref()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("parameters", &self.definition.parameters())
            .finish_non_exhaustive()
    }
}

/// Attribute table produced by running a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    name: String,
    attributes: BTreeMap<String, Value>,
}

impl Class {
    pub(crate) fn new(
        name: String,
        attributes: BTreeMap<String, Value>,
    ) -> Self {
        Self { name, attributes }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

/// Runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(List),
    Tuple(Vec<Value>),
    Dict(Dict),
    Function(Function),
    Class(Rc<Class>),
    /// Placeholder bound by `import`. Nothing is loaded.
    Module(String),
}

/// Numeric view of a value. Booleans count as 0 and 1.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub(crate) fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl Value {
    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn dict(pairs: Vec<(Value, Value)>) -> Self {
        Value::Dict(Rc::new(RefCell::new(pairs)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Class(_) => "type",
            Value::Module(_) => "module",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => !list.borrow().is_empty(),
            Value::Tuple(elements) => !elements.is_empty(),
            Value::Dict(pairs) => !pairs.borrow().is_empty(),
            Value::Function(_) | Value::Class(_) | Value::Module(_) => true,
        }
    }

    pub(crate) fn number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Quoted representation, as used inside containers.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, true, &mut Vec::new());
        out
    }

    /// The elements a `for` loop visits: list and tuple items, string
    /// characters or dictionary keys.
    pub fn elements(&self) -> Result<Vec<Value>> {
        match self {
            Value::List(list) => Ok(list.borrow().clone()),
            Value::Tuple(elements) => Ok(elements.clone()),
            Value::Str(s) => {
                Ok(s.chars().map(|c| Value::Str(c.to_string())).collect())
            }
            Value::Dict(pairs) => {
                Ok(pairs.borrow().iter().map(|(k, _)| k.clone()).collect())
            }
            other => Err(RuntimeError::NotIterable(other.type_name())),
        }
    }

    pub(crate) fn ensure_hashable(&self) -> Result<()> {
        match self {
            Value::List(_) | Value::Dict(_) => {
                Err(RuntimeError::Unhashable(self.type_name()))
            }
            _ => Ok(()),
        }
    }

    fn render(&self, out: &mut String, quoted: bool, seen: &mut Vec<usize>) {
        // Writing to a String can not fail.
        let _ = match self {
            Value::None => write!(out, "None"),
            Value::Bool(true) => write!(out, "True"),
            Value::Bool(false) => write!(out, "False"),
            Value::Int(i) => write!(out, "{}", i),
            Value::Float(f) => write!(out, "{}", format_float(*f)),
            Value::Str(s) if quoted => {
                write!(out, "'{}'", s.replace('\'', "\\'"))
            }
            Value::Str(s) => write!(out, "{}", s),
            Value::List(list) => {
                let address = Rc::as_ptr(list) as usize;

                if seen.contains(&address) {
                    write!(out, "[...]")
                } else {
                    seen.push(address);
                    render_sequence(out, "[", "]", &list.borrow(), seen);
                    seen.pop();
                    Ok(())
                }
            }
            Value::Tuple(elements) => {
                if elements.len() == 1 {
                    out.push('(');
                    elements[0].render(out, true, seen);
                    write!(out, ",)")
                } else {
                    render_sequence(out, "(", ")", elements, seen);
                    Ok(())
                }
            }
            Value::Dict(pairs) => {
                let address = Rc::as_ptr(pairs) as usize;

                if seen.contains(&address) {
                    write!(out, "{{...}}")
                } else {
                    seen.push(address);
                    out.push('{');

                    for (i, (key, value)) in pairs.borrow().iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        key.render(out, true, seen);
                        out.push_str(": ");
                        value.render(out, true, seen);
                    }

                    out.push('}');
                    seen.pop();
                    Ok(())
                }
            }
            Value::Function(function) => {
                write!(out, "<function {}>", function.name())
            }
            Value::Class(class) => write!(out, "<class '{}'>", class.name()),
            Value::Module(name) => write!(out, "<module '{}'>", name),
        };
    }
}

fn render_sequence(
    out: &mut String,
    open: &str,
    close: &str,
    elements: &[Value],
    seen: &mut Vec<usize>,
) {
    out.push_str(open);

    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        element.render(out, true, seen);
    }

    out.push_str(close);
}

/// Floats always show a fractional part, like `1.0`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

pub(crate) fn dict_get(
    pairs: &[(Value, Value)],
    key: &Value,
) -> Option<Value> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Replaces the value of an existing key or appends a new pair.
pub(crate) fn dict_insert(
    pairs: &mut Vec<(Value, Value)>,
    key: Value,
    value: Value,
) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(pair) => pair.1 = value,
        None => pairs.push((key, value)),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, false, &mut Vec::new());
        write!(f, "{}", out)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}

impl Value {
    /// Structural equality. `seen` holds the container pairs being compared
    /// further up, a pair met again is taken as equal.
    fn equals(&self, other: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b))
            | (Value::Module(a), Value::Module(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }

                let pair = (Rc::as_ptr(a) as usize, Rc::as_ptr(b) as usize);

                if seen.contains(&pair) {
                    return true;
                }

                seen.push(pair);
                let equal = sequences_equal(&a.borrow(), &b.borrow(), seen);
                seen.pop();

                equal
            }
            (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b, seen),
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }

                let pair = (Rc::as_ptr(a) as usize, Rc::as_ptr(b) as usize);

                if seen.contains(&pair) {
                    return true;
                }

                seen.push(pair);

                let equal = {
                    let (a, b) = (a.borrow(), b.borrow());

                    a.len() == b.len()
                        && a.iter().all(|(key, value)| {
                            dict_get(&b, key)
                                .map_or(false, |v| v.equals(value, seen))
                        })
                };

                seen.pop();
                equal
            }
            (Value::Function(a), Value::Function(b)) => {
                Rc::ptr_eq(&a.definition, &b.definition)
            }
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (a, b) => match (a.number(), b.number()) {
                (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
                _ => false,
            },
        }
    }
}

fn sequences_equal(
    a: &[Value],
    b: &[Value],
    seen: &mut Vec<(usize, usize)>,
) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.equals(b, seen))
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl Serialize for Value {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Tracked {
            value: self,
            seen: &RefCell::new(Vec::new()),
        }
        .serialize(serializer)
    }
}

/// Serializes a value while tracking the containers currently being
/// written, so a container that holds itself is written as its display
/// string instead of recursing.
struct Tracked<'a> {
    value: &'a Value,
    seen: &'a RefCell<Vec<usize>>,
}

impl Tracked<'_> {
    fn child<'b>(&'b self, value: &'b Value) -> Tracked<'b> {
        Tracked {
            value,
            seen: self.seen,
        }
    }
}

impl Serialize for Tracked<'_> {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let address = match self.value {
            Value::List(list) => Some(Rc::as_ptr(list) as usize),
            Value::Dict(dict) => Some(Rc::as_ptr(dict) as usize),
            _ => None,
        };

        if let Some(address) = address {
            if self.seen.borrow().contains(&address) {
                return serializer.serialize_str(&self.value.to_string());
            }

            self.seen.borrow_mut().push(address);
        }

        let result = match self.value {
            Value::None => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let list = list.borrow();
                serializer.collect_seq(list.iter().map(|e| self.child(e)))
            }
            Value::Tuple(elements) => {
                serializer.collect_seq(elements.iter().map(|e| self.child(e)))
            }
            Value::Dict(pairs) => {
                let pairs = pairs.borrow();
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs.iter() {
                    map.serialize_entry(&key.to_string(), &self.child(value))?;
                }
                map.end()
            }
            Value::Function(_) | Value::Class(_) | Value::Module(_) => {
                serializer.serialize_str(&self.value.to_string())
            }
        };

        if address.is_some() {
            self.seen.borrow_mut().pop();
        }

        result
    }
}
