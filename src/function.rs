use crate::error::RuntimeError;
use crate::value::{dict_insert, format_float, Value};
use conv::{ConvAsUtil, RoundToZero};
use log::trace;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Names callable without a definition. Shared by the analyzer and the
/// interpreter.
pub const BUILTINS: [&str; 8] =
    ["print", "len", "str", "int", "float", "bool", "list", "dict"];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Dispatches a builtin call. `print` appends a line to `output`.
pub(crate) fn handle_builtin(
    name: &str,
    arguments: Vec<Value>,
    output: &mut Vec<String>,
) -> Result<Value> {
    validate(name, &arguments)?;
    trace!("Builtin {}({} argument(s))", name, arguments.len());

    let mut arguments = arguments.into_iter();
    let first = arguments.next();

    match name {
        "print" => {
            let line = first
                .into_iter()
                .chain(arguments)
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(" ");

            output.push(line);
            Ok(Value::None)
        }
        "len" => function_len(first.as_ref().unwrap_or(&Value::None)),
        "str" => Ok(Value::Str(first.map(|v| v.to_string()).unwrap_or_default())),
        "int" => first.map_or(Ok(Value::Int(0)), |v| function_int(&v)),
        "float" => first.map_or(Ok(Value::Float(0.0)), |v| function_float(&v)),
        "bool" => Ok(Value::Bool(first.map_or(false, |v| v.is_truthy()))),
        "list" => match first {
            Some(value) => Ok(Value::list(value.elements()?)),
            None => Ok(Value::list(Vec::new())),
        },
        "dict" => first.map_or(Ok(Value::dict(Vec::new())), |v| function_dict(&v)),
        _ => Err(RuntimeError::UnsupportedBuiltin(name.to_string())),
    }
}

fn validate(name: &str, arguments: &[Value]) -> Result<()> {
    let (minimum, maximum) = match name {
        "print" => return Ok(()),
        "len" => (1, 1),
        "str" | "int" | "float" | "bool" | "list" | "dict" => (0, 1),
        _ => return Err(RuntimeError::UnsupportedBuiltin(name.to_string())),
    };

    let found = arguments.len();

    if (minimum..=maximum).contains(&found) {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCount {
            name: name.to_string(),
            expected: maximum,
            found,
        })
    }
}

fn function_len(value: &Value) -> Result<Value> {
    let length = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(list) => list.borrow().len(),
        Value::Tuple(elements) => elements.len(),
        Value::Dict(pairs) => pairs.borrow().len(),
        other => {
            return Err(RuntimeError::InvalidArgument {
                function: "len",
                type_name: other.type_name(),
            })
        }
    };

    i64::try_from(length)
        .map(Value::Int)
        .map_err(|_| RuntimeError::Overflow("len".to_string()))
}

fn function_int(value: &Value) -> Result<Value> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(RuntimeError::Conversion {
                    target: "int",
                    value: format_float(*f),
                });
            }

            (*f).approx_by::<RoundToZero>()
                .map(Value::Int)
                .map_err(|_| RuntimeError::Overflow("int".to_string()))
        }
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            RuntimeError::Conversion {
                target: "int",
                value: s.clone(),
            }
        }),
        other => Err(RuntimeError::InvalidArgument {
            function: "int",
            type_name: other.type_name(),
        }),
    }
}

fn function_float(value: &Value) -> Result<Value> {
    match value {
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            RuntimeError::Conversion {
                target: "float",
                value: s.clone(),
            }
        }),
        other => match other.number() {
            Some(number) => Ok(Value::Float(number.as_f64())),
            None => Err(RuntimeError::InvalidArgument {
                function: "float",
                type_name: other.type_name(),
            }),
        },
    }
}

/// Copies a dictionary, or builds one from a sequence of pairs.
fn function_dict(value: &Value) -> Result<Value> {
    if let Value::Dict(pairs) = value {
        return Ok(Value::dict(pairs.borrow().clone()));
    }

    let mut pairs = Vec::new();

    for element in value.elements()? {
        let pair = match &element {
            Value::Tuple(_) | Value::List(_) => element.elements()?,
            other => {
                return Err(RuntimeError::InvalidArgument {
                    function: "dict",
                    type_name: other.type_name(),
                })
            }
        };

        match <[Value; 2]>::try_from(pair) {
            Ok([key, value]) => {
                key.ensure_hashable()?;
                dict_insert(&mut pairs, key, value);
            }
            Err(_) => {
                return Err(RuntimeError::InvalidArgument {
                    function: "dict",
                    type_name: element.type_name(),
                })
            }
        }
    }

    Ok(Value::dict(pairs))
}

/// Dispatches a method call on a list or dictionary.
pub(crate) fn handle_method(
    target: &Value,
    method: &str,
    arguments: Vec<Value>,
) -> Result<Value> {
    trace!("Method {}.{}", target.type_name(), method);

    let unknown = || RuntimeError::UnknownMethod {
        method: method.to_string(),
        type_name: target.type_name(),
    };

    let expect = |expected: usize| {
        if arguments.len() == expected {
            Ok(())
        } else {
            Err(RuntimeError::ArgumentCount {
                name: method.to_string(),
                expected,
                found: arguments.len(),
            })
        }
    };

    match (target, method) {
        (Value::List(list), "append") => {
            expect(1)?;
            list.borrow_mut().extend(arguments);
            Ok(Value::None)
        }
        (Value::List(list), "extend") => {
            expect(1)?;
            // Collected first, so a list can extend itself.
            let elements = arguments[0].elements()?;
            list.borrow_mut().extend(elements);
            Ok(Value::None)
        }
        (Value::List(list), "pop") => {
            if arguments.len() > 1 {
                expect(1)?;
            }

            let mut list = list.borrow_mut();
            let length = list.len();

            let index = match arguments.first() {
                None => length.checked_sub(1),
                Some(Value::Int(i)) => list_index(*i, length),
                Some(other) => {
                    return Err(RuntimeError::InvalidArgument {
                        function: "pop",
                        type_name: other.type_name(),
                    })
                }
            };

            match index {
                Some(index) if index < length => Ok(list.remove(index)),
                _ if length == 0 => Err(RuntimeError::IndexOutOfRange(
                    "pop from empty list".to_string(),
                )),
                _ => Err(RuntimeError::IndexOutOfRange(
                    "pop index out of range".to_string(),
                )),
            }
        }
        (Value::List(list), "clear") => {
            expect(0)?;
            list.borrow_mut().clear();
            Ok(Value::None)
        }
        (Value::Dict(pairs), "update") => {
            expect(1)?;

            let other = match &arguments[0] {
                Value::Dict(other) => other.borrow().clone(),
                other => {
                    return Err(RuntimeError::InvalidArgument {
                        function: "update",
                        type_name: other.type_name(),
                    })
                }
            };

            let mut pairs = pairs.borrow_mut();

            for (key, value) in other {
                dict_insert(&mut pairs, key, value);
            }

            Ok(Value::None)
        }
        (Value::Dict(pairs), "clear") => {
            expect(0)?;
            pairs.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(unknown()),
    }
}

/// Resolves a possibly negative index against `length`.
fn list_index(index: i64, length: usize) -> Option<usize> {
    if index < 0 {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        length.checked_sub(back)
    } else {
        usize::try_from(index).ok()
    }
}
