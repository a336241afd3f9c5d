#[allow(clippy::wildcard_imports)]
use crate::ast::node::*;
use crate::ast::Visitor;
use crate::environment::{Scope, Store};
use crate::error::{RuntimeError, RuntimeFailure};
use crate::function::{handle_builtin, handle_method};
use crate::operators;
use crate::template::{segments, Segment};
use crate::value::{dict_insert, Class, Function, Value};
use itertools::EitherOrBoth::{Both, Left, Right};
use itertools::Itertools;
use log::{debug, trace};
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, RuntimeError>;

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

/// How calls see bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoping {
    /// One flat store. A call snapshots it, binds its parameters and
    /// restores the snapshot when it returns, so a callee sees its caller's
    /// bindings.
    #[default]
    Dynamic,
    /// A function sees the scope it was defined in. Each call gets a new
    /// frame on top of that scope.
    Lexical,
}

/// Host-imposed limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limits {
    /// Total loop iterations over the whole run.
    pub max_iterations: Option<u64>,
    /// Nested user function calls.
    pub max_call_depth: Option<usize>,
}

/// Options for the [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionOptions {
    pub scoping: Scoping,
    pub limits: Limits,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Execution {
    /// One entry per `print` call.
    pub output: Vec<String>,
    /// Global bindings after the last statement.
    pub bindings: BTreeMap<String, Value>,
}

/// Executes a [`Program`] that passed semantic analysis.
#[derive(Debug)]
pub struct Interpreter {
    store: Store,
    output: Vec<String>,
    limits: Limits,
    iterations: u64,
    depth: usize,
}

impl Interpreter {
    fn new(options: ExecutionOptions) -> Self {
        debug!("Creating Interpreter with {:?}", options);

        let store = match options.scoping {
            Scoping::Dynamic => Store::Dynamic(BTreeMap::new()),
            Scoping::Lexical => Store::Lexical(Scope::new_ref(None)),
        };

        Self {
            store,
            output: Vec::new(),
            limits: options.limits,
            iterations: 0,
            depth: 0,
        }
    }

    /// Public function for [`Interpreter`]. On failure, the output produced
    /// so far is kept in the [`RuntimeFailure`].
    pub fn execute(
        program: &Program,
        options: ExecutionOptions,
    ) -> std::result::Result<Execution, RuntimeFailure> {
        let mut interpreter = Self::new(options);

        match interpreter.visit_program(program) {
            Ok(_) => {
                debug!(
                    "Execution finished with {} line(s) of output",
                    interpreter.output.len()
                );

                Ok(Execution {
                    output: interpreter.output,
                    bindings: interpreter.store.frame(),
                })
            }
            Err(error) => {
                debug!("Execution failed: {}", error);

                Err(RuntimeFailure {
                    error,
                    output: interpreter.output,
                })
            }
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value> {
        self.visit_expression(expression)
    }

    fn evaluate_all(&mut self, expressions: &[Expression]) -> Result<Vec<Value>> {
        expressions.iter().map(|e| self.evaluate(e)).collect()
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        self.store
            .lookup(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    fn execute_block(&mut self, body: &[Statement]) -> Result<Flow> {
        for statement in body {
            trace!("Executing {}", statement.name());

            match self.visit_statement(statement)? {
                Flow::Normal => (),
                flow => return Ok(flow),
            }
        }

        Ok(Flow::Normal)
    }

    /// Counts a loop iteration against the iteration limit.
    fn tick(&mut self) -> Result<()> {
        self.iterations += 1;

        match self.limits.max_iterations {
            Some(max) if self.iterations > max => {
                Err(RuntimeError::IterationLimit(max))
            }
            _ => Ok(()),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        if let Some(max) = self.limits.max_call_depth {
            if self.depth >= max {
                return Err(RuntimeError::DepthLimit(max));
            }
        }

        let definition = function.definition();
        trace!("Calling {}", definition.name());

        let saved = self.store.enter_call(function.closure());

        self.depth += 1;
        let result = self
            .bind_arguments(definition, arguments)
            .and_then(|()| self.execute_block(definition.body()));
        self.depth -= 1;

        // Restored whether or not the call succeeded.
        self.store = saved;

        match result? {
            Flow::Normal => Ok(Value::None),
            Flow::Return(value) => Ok(value),
            Flow::Break => Err(RuntimeError::BreakOutsideLoop),
        }
    }

    fn bind_arguments(
        &mut self,
        definition: &FunctionDef,
        arguments: Vec<Value>,
    ) -> Result<()> {
        let found = arguments.len();

        for pair in definition.parameters().iter().zip_longest(arguments) {
            match pair {
                Both(parameter, argument) => {
                    self.store.assign(parameter, argument);
                }
                Left(_) | Right(_) => {
                    return Err(RuntimeError::ArgumentCount {
                        name: definition.name().to_string(),
                        expected: definition.parameters().len(),
                        found,
                    })
                }
            }
        }

        Ok(())
    }

    fn run_loop_body(&mut self, body: &[Statement]) -> Result<Option<Flow>> {
        self.tick()?;

        match self.execute_block(body)? {
            Flow::Normal => Ok(None),
            Flow::Break => Ok(Some(Flow::Normal)),
            flow @ Flow::Return(_) => Ok(Some(flow)),
        }
    }

    fn format(&self, template: &str) -> Result<String> {
        let mut out = String::new();

        for segment in segments(template) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    out.push_str(&self.lookup(name)?.to_string());
                }
            }
        }

        Ok(out)
    }
}

impl Visitor<Result<Flow>, Result<Value>> for Interpreter {
    fn visit_program(&mut self, program: &Program) -> Result<Flow> {
        match self.execute_block(program.body())? {
            Flow::Break => Err(RuntimeError::BreakOutsideLoop),
            _ => Ok(Flow::Normal),
        }
    }

    fn visit_function_def(&mut self, function: &Rc<FunctionDef>) -> Result<Flow> {
        let value = Function::new(Rc::clone(function), self.store.capture());
        self.store.assign(function.name(), Value::Function(value));

        Ok(Flow::Normal)
    }

    fn visit_class_def(&mut self, name: &str, body: &[Statement]) -> Result<Flow> {
        let saved = self.store.enter_class();
        let result = self.execute_block(body);
        let attributes = self.store.frame();
        self.store = saved;

        if result? == Flow::Break {
            return Err(RuntimeError::BreakOutsideLoop);
        }

        let class = Class::new(name.to_string(), attributes);
        self.store.assign(name, Value::Class(Rc::new(class)));

        Ok(Flow::Normal)
    }

    fn visit_import(&mut self, names: &[ImportName]) -> Result<Flow> {
        for import in names {
            trace!("Importing {} as {}", import.module, import.bound_name());
            self.store
                .assign(import.bound_name(), Value::Module(import.module.clone()));
        }

        Ok(Flow::Normal)
    }

    fn visit_while(
        &mut self,
        condition: &Expression,
        body: &[Statement],
    ) -> Result<Flow> {
        while self.evaluate(condition)?.is_truthy() {
            if let Some(flow) = self.run_loop_body(body)? {
                return Ok(flow);
            }
        }

        Ok(Flow::Normal)
    }

    fn visit_for(
        &mut self,
        target: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> Result<Flow> {
        let elements = self.evaluate(iterable)?.elements()?;

        for element in elements {
            self.store.assign(target, element);

            if let Some(flow) = self.run_loop_body(body)? {
                return Ok(flow);
            }
        }

        Ok(Flow::Normal)
    }

    fn visit_if(
        &mut self,
        condition: &Expression,
        body: &[Statement],
        elif_blocks: &[ElifBlock],
        else_body: Option<&[Statement]>,
    ) -> Result<Flow> {
        if self.evaluate(condition)?.is_truthy() {
            return self.execute_block(body);
        }

        for block in elif_blocks {
            if self.evaluate(&block.condition)?.is_truthy() {
                return self.execute_block(&block.body);
            }
        }

        match else_body {
            Some(else_body) => self.execute_block(else_body),
            None => Ok(Flow::Normal),
        }
    }

    fn visit_try(
        &mut self,
        body: &[Statement],
        handlers: &[ExceptHandler],
        else_body: Option<&[Statement]>,
        finally_body: Option<&[Statement]>,
    ) -> Result<Flow> {
        let outcome = match self.execute_block(body) {
            Ok(Flow::Normal) => match else_body {
                Some(else_body) => self.execute_block(else_body),
                None => Ok(Flow::Normal),
            },
            Ok(flow) => Ok(flow),
            Err(error) if !error.is_catchable() => return Err(error),
            Err(error) => {
                let kind = error.kind();

                match handlers.iter().find(|h| h.matches(kind)) {
                    Some(handler) => {
                        trace!("Handling {}: {}", kind, error);

                        if let Some(alias) = &handler.alias {
                            self.store.assign(alias, Value::Str(error.to_string()));
                        }

                        self.execute_block(&handler.body)
                    }
                    None => Err(error),
                }
            }
        };

        match finally_body {
            Some(finally_body) => match self.execute_block(finally_body)? {
                Flow::Normal => outcome,
                flow => Ok(flow),
            },
            None => outcome,
        }
    }

    fn visit_pass(&mut self) -> Result<Flow> {
        Ok(Flow::Normal)
    }

    fn visit_break(&mut self) -> Result<Flow> {
        Ok(Flow::Break)
    }

    fn visit_return(&mut self, value: Option<&Expression>) -> Result<Flow> {
        let value = match value {
            Some(expression) => self.evaluate(expression)?,
            None => Value::None,
        };

        Ok(Flow::Return(value))
    }

    fn visit_assignment(&mut self, target: &str, value: &Expression) -> Result<Flow> {
        let value = self.evaluate(value)?;
        self.store.assign(target, value);

        Ok(Flow::Normal)
    }

    fn visit_augmented_assignment(
        &mut self,
        target: &str,
        operator: BinaryOperator,
        value: &Expression,
    ) -> Result<Flow> {
        let current = self.lookup(target)?;
        let value = self.evaluate(value)?;

        let result = operators::binary(&current, operator, &value)?;
        self.store.assign(target, result);

        Ok(Flow::Normal)
    }

    fn visit_call_statement(
        &mut self,
        name: &str,
        arguments: &[Expression],
    ) -> Result<Flow> {
        self.visit_call(name, arguments)?;

        Ok(Flow::Normal)
    }

    fn visit_method_call(
        &mut self,
        object: &str,
        method: &str,
        arguments: &[Expression],
    ) -> Result<Flow> {
        let target = self.lookup(object)?;
        let arguments = self.evaluate_all(arguments)?;

        match &target {
            Value::Class(class) => match class.attribute(method) {
                Some(Value::Function(function)) => {
                    let function = function.clone();
                    self.call_function(&function, arguments)?;
                }
                Some(other) => {
                    return Err(RuntimeError::NotCallable {
                        name: format!("{}.{}", object, method),
                        type_name: other.type_name(),
                    })
                }
                None => {
                    return Err(RuntimeError::UnknownMethod {
                        method: method.to_string(),
                        type_name: target.type_name(),
                    })
                }
            },
            _ => {
                handle_method(&target, method, arguments)?;
            }
        }

        Ok(Flow::Normal)
    }

    fn visit_identifier(&mut self, name: &str) -> Result<Value> {
        self.lookup(name)
    }

    fn visit_constant(&mut self, constant: &Constant) -> Result<Value> {
        Ok(match constant {
            Constant::None => Value::None,
            Constant::Bool(b) => Value::Bool(*b),
            Constant::Int(i) => Value::Int(*i),
            Constant::Float(f) => Value::Float(*f),
        })
    }

    fn visit_string(&mut self, value: &str, formatted: bool) -> Result<Value> {
        if formatted {
            self.format(value).map(Value::Str)
        } else {
            Ok(Value::from(value))
        }
    }

    fn visit_list(&mut self, elements: &[Expression]) -> Result<Value> {
        self.evaluate_all(elements).map(Value::list)
    }

    fn visit_dict(&mut self, pairs: &[(Expression, Expression)]) -> Result<Value> {
        let mut dict = Vec::with_capacity(pairs.len());

        for (key, value) in pairs {
            let key = self.evaluate(key)?;
            key.ensure_hashable()?;
            let value = self.evaluate(value)?;

            dict_insert(&mut dict, key, value);
        }

        Ok(Value::dict(dict))
    }

    fn visit_tuple(&mut self, elements: &[Expression]) -> Result<Value> {
        self.evaluate_all(elements).map(Value::Tuple)
    }

    fn visit_unaryop(
        &mut self,
        operator: UnaryOperator,
        operand: &Expression,
    ) -> Result<Value> {
        let operand = self.evaluate(operand)?;

        operators::unary(operator, &operand)
    }

    fn visit_binaryop(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> Result<Value> {
        // `and` and `or` evaluate both operands too.
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        operators::binary(&left, operator, &right)
    }

    fn visit_call(&mut self, name: &str, arguments: &[Expression]) -> Result<Value> {
        let arguments = self.evaluate_all(arguments)?;

        match self.store.lookup(name) {
            Some(Value::Function(function)) => {
                self.call_function(&function, arguments)
            }
            Some(other) => Err(RuntimeError::NotCallable {
                name: name.to_string(),
                type_name: other.type_name(),
            }),
            None => handle_builtin(name, arguments, &mut self.output),
        }
    }
}
