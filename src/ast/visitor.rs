#![allow(missing_docs)]

#[allow(clippy::wildcard_imports)]
use crate::ast::node::*;
use std::rc::Rc;

/// [Visitor] walks a [Program]. Statements produce `S`, expressions `E`.
pub trait Visitor<S, E> {
    fn visit_program(&mut self, program: &Program) -> S;

    fn visit_statement(&mut self, statement: &Statement) -> S {
        match statement {
            Statement::FunctionDef(function) => {
                self.visit_function_def(function)
            }
            Statement::ClassDef { name, body } => {
                self.visit_class_def(name, body)
            }
            Statement::Import { names } => self.visit_import(names),
            Statement::While { condition, body } => {
                self.visit_while(condition, body)
            }
            Statement::For {
                target,
                iterable,
                body,
            } => self.visit_for(target, iterable, body),
            Statement::If {
                condition,
                body,
                elif_blocks,
                else_body,
            } => self.visit_if(
                condition,
                body,
                elif_blocks,
                else_body.as_deref(),
            ),
            Statement::Try {
                body,
                handlers,
                else_body,
                finally_body,
            } => self.visit_try(
                body,
                handlers,
                else_body.as_deref(),
                finally_body.as_deref(),
            ),
            Statement::Pass => self.visit_pass(),
            Statement::Break => self.visit_break(),
            Statement::Return { value } => self.visit_return(value.as_ref()),
            Statement::Assignment { target, value } => {
                self.visit_assignment(target, value)
            }
            Statement::AugmentedAssignment {
                target,
                operator,
                value,
            } => self.visit_augmented_assignment(target, *operator, value),
            Statement::Call { name, arguments } => {
                self.visit_call_statement(name, arguments)
            }
            Statement::MethodCall {
                object,
                method,
                arguments,
            } => self.visit_method_call(object, method, arguments),
        }
    }

    fn visit_function_def(&mut self, function: &Rc<FunctionDef>) -> S;

    fn visit_class_def(&mut self, name: &str, body: &[Statement]) -> S;

    fn visit_import(&mut self, names: &[ImportName]) -> S;

    fn visit_while(&mut self, condition: &Expression, body: &[Statement]) -> S;

    fn visit_for(
        &mut self,
        target: &str,
        iterable: &Expression,
        body: &[Statement],
    ) -> S;

    fn visit_if(
        &mut self,
        condition: &Expression,
        body: &[Statement],
        elif_blocks: &[ElifBlock],
        else_body: Option<&[Statement]>,
    ) -> S;

    fn visit_try(
        &mut self,
        body: &[Statement],
        handlers: &[ExceptHandler],
        else_body: Option<&[Statement]>,
        finally_body: Option<&[Statement]>,
    ) -> S;

    fn visit_pass(&mut self) -> S;

    fn visit_break(&mut self) -> S;

    fn visit_return(&mut self, value: Option<&Expression>) -> S;

    fn visit_assignment(&mut self, target: &str, value: &Expression) -> S;

    fn visit_augmented_assignment(
        &mut self,
        target: &str,
        operator: BinaryOperator,
        value: &Expression,
    ) -> S;

    fn visit_call_statement(
        &mut self,
        name: &str,
        arguments: &[Expression],
    ) -> S;

    fn visit_method_call(
        &mut self,
        object: &str,
        method: &str,
        arguments: &[Expression],
    ) -> S;

    fn visit_expression(&mut self, expression: &Expression) -> E {
        match expression {
            Expression::Identifier { name } => self.visit_identifier(name),
            Expression::Constant { value } => self.visit_constant(value),
            Expression::Str { value, formatted } => {
                self.visit_string(value, *formatted)
            }
            Expression::List { elements } => self.visit_list(elements),
            Expression::Dict { pairs } => self.visit_dict(pairs),
            Expression::Tuple { elements } => self.visit_tuple(elements),
            Expression::UnaryOp { operator, operand } => {
                self.visit_unaryop(*operator, operand)
            }
            Expression::BinaryOp {
                left,
                operator,
                right,
            } => self.visit_binaryop(left, *operator, right),
            Expression::Call { name, arguments } => {
                self.visit_call(name, arguments)
            }
        }
    }

    fn visit_identifier(&mut self, name: &str) -> E;

    fn visit_constant(&mut self, constant: &Constant) -> E;

    fn visit_string(&mut self, value: &str, formatted: bool) -> E;

    fn visit_list(&mut self, elements: &[Expression]) -> E;

    fn visit_dict(&mut self, pairs: &[(Expression, Expression)]) -> E;

    fn visit_tuple(&mut self, elements: &[Expression]) -> E;

    fn visit_unaryop(
        &mut self,
        operator: UnaryOperator,
        operand: &Expression,
    ) -> E;

    fn visit_binaryop(
        &mut self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> E;

    fn visit_call(&mut self, name: &str, arguments: &[Expression]) -> E;
}
